/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Byte transforms: XOR, bit rotation and (with feature `zlib`) RFC 1950
//! compression.

use core::convert::Infallible;

use crate::error::{Error, Result};
use crate::traits::Process;

/// Returns `data` XORed with `key`.
#[must_use]
pub fn process_xor_one(data: &[u8], key: u8) -> Vec<u8> {
    data.iter().map(|&b| b ^ key).collect()
}

/// Returns `data` XORed with `key` repeated cyclically.
///
/// An empty key leaves the data unchanged.
#[must_use]
pub fn process_xor_many(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .zip(key.iter().cycle())
        .map(|(&b, &k)| b ^ k)
        .collect()
}

/// Returns `data` with each group of `group_size` bytes rotated left by
/// `amount` bits; a negative amount rotates right.
///
/// Only single-byte groups are supported: other group sizes fail with
/// [`Error::InvalidSize`].
pub fn process_rotate_left(data: &[u8], amount: i32, group_size: usize) -> Result<Vec<u8>> {
    if group_size != 1 {
        return Err(Error::InvalidSize {
            context: "rotation group",
            size: group_size as i64,
        });
    }
    let amount = amount.rem_euclid(8) as u32;
    Ok(data.iter().map(|b| b.rotate_left(amount)).collect())
}

/// Returns `data` with each group of `group_size` bytes rotated right by
/// `amount` bits. See [`process_rotate_left`].
pub fn process_rotate_right(data: &[u8], amount: i32, group_size: usize) -> Result<Vec<u8>> {
    process_rotate_left(data, amount.wrapping_neg(), group_size)
}

/// Decompresses a zlib (RFC 1950) stream.
///
/// Errors of the decoder are returned unchanged.
#[cfg(feature = "zlib")]
pub fn process_zlib(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use std::io::Read;
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// Compresses `data` into a zlib (RFC 1950) stream with the default
/// compression level.
#[cfg(feature = "zlib")]
pub fn unprocess_zlib(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use std::io::Write;
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// XOR with a cyclic key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(mem_dbg::MemDbg, mem_dbg::MemSize))]
pub struct Xor {
    pub key: Vec<u8>,
}

impl Process for Xor {
    type Error = Infallible;

    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, Infallible> {
        Ok(process_xor_many(data, &self.key))
    }

    fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, Infallible> {
        Ok(process_xor_many(data, &self.key))
    }
}

/// Left rotation on decode, right rotation on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(mem_dbg::MemDbg, mem_dbg::MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
pub struct Rotate {
    pub amount: i32,
    pub group_size: usize,
}

impl Process for Rotate {
    type Error = Error;

    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        process_rotate_left(data, self.amount, self.group_size)
    }

    fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        process_rotate_right(data, self.amount, self.group_size)
    }
}

/// Decompression on decode, compression on encode.
#[cfg(feature = "zlib")]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zlib;

#[cfg(feature = "zlib")]
impl Process for Zlib {
    type Error = std::io::Error;

    fn decode(&mut self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        process_zlib(data)
    }

    fn encode(&mut self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        unprocess_zlib(data)
    }
}
