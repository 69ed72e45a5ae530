/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Stateless helpers on byte arrays and strings.

/// Returns `data` without its trailing `pad` bytes.
#[must_use]
pub fn bytes_strip_right(data: &[u8], pad: u8) -> &[u8] {
    let end = data.iter().rposition(|&b| b != pad).map_or(0, |i| i + 1);
    &data[..end]
}

/// Returns the prefix of `data` ending before the first `term` byte, or
/// just after it if `include_term` is true.
///
/// If `term` does not occur, the whole of `data` is returned.
#[must_use]
pub fn bytes_terminate(data: &[u8], term: u8, include_term: bool) -> &[u8] {
    match data.iter().position(|&b| b == term) {
        Some(i) => &data[..i + include_term as usize],
        None => data,
    }
}

/// Returns the prefix of `data` ending before the first occurrence of
/// `term` starting at a multiple of `term.len()`, or just after it if
/// `include_term` is true.
///
/// If there is no such occurrence, or if `term` is empty, the whole of
/// `data` is returned.
#[must_use]
pub fn bytes_terminate_multi<'a>(data: &'a [u8], term: &[u8], include_term: bool) -> &'a [u8] {
    if term.is_empty() {
        return data;
    }
    match data.chunks_exact(term.len()).position(|unit| unit == term) {
        Some(i) => &data[..(i + include_term as usize) * term.len()],
        None => data,
    }
}

/// Returns the index of the first occurrence of `b` in `data`.
#[must_use]
pub fn byte_array_index_of(data: &[u8], b: u8) -> Option<usize> {
    data.iter().position(|&x| x == b)
}

/// Returns the smallest byte of `data`, or `None` if `data` is empty.
#[must_use]
pub fn byte_array_min(data: &[u8]) -> Option<u8> {
    data.iter().copied().min()
}

/// Returns the largest byte of `data`, or `None` if `data` is empty.
#[must_use]
pub fn byte_array_max(data: &[u8]) -> Option<u8> {
    data.iter().copied().max()
}

/// Returns `s` with its characters in reverse order.
#[must_use]
pub fn string_reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// Returns the remainder of `a` divided by `b`, shifted by `b` when
/// negative, so that for a positive `b` the result is in `0..b`.
///
/// # Panics
///
/// As the `%` operator, if `b` is zero or the division overflows.
#[must_use]
pub fn modulo(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r < 0 { r + b } else { r }
}
