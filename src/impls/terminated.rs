/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io::{Read, Seek, Write, copy, repeat};

use tracing::trace;

use crate::error::{Error, Result};
use crate::impls::Stream;
use crate::utils::{bytes_strip_right, bytes_terminate};

/// Size of the chunks read while scanning for a single-byte terminator.
const SCAN_CHUNK: usize = 256;

impl<M: Read + Seek> Stream<M> {
    /// Reads `size` bytes, strips trailing `pad` bytes and truncates the
    /// result at the first `term` byte, which is kept if `include_term` is
    /// true. A missing terminator is not an error.
    pub fn read_bytes_pad_term(
        &mut self,
        size: i64,
        term: u8,
        pad: u8,
        include_term: bool,
    ) -> Result<Vec<u8>> {
        let buf = self.read_bytes(size)?;
        Ok(bytes_terminate(bytes_strip_right(&buf, pad), term, include_term).to_vec())
    }

    /// Reads bytes up to the byte `term`.
    ///
    /// The terminator is part of the result if `include_term` is true. The
    /// stream is left just after the terminator if `consume_term` is true,
    /// and on the terminator otherwise, independently of how many bytes were
    /// read ahead while scanning.
    ///
    /// If the medium ends before a terminator is found, the call fails with
    /// [`Error::EndOfStream`] if `eos_error` is true, and returns all bytes up
    /// to the end of the medium otherwise.
    pub fn read_bytes_term(
        &mut self,
        term: u8,
        include_term: bool,
        consume_term: bool,
        eos_error: bool,
    ) -> Result<Vec<u8>> {
        self.drop_read_bits()?;
        let start = self.pos()?;
        let mut res = Vec::new();
        let mut chunk = [0u8; SCAN_CHUNK];
        loop {
            let n = self.read_up_to(&mut chunk)?;
            if let Some(i) = chunk[..n].iter().position(|&b| b == term) {
                res.extend_from_slice(&chunk[..i]);
                let end = start + res.len() as u64 + consume_term as u64;
                if include_term {
                    res.push(term);
                }
                trace!(term, start, end, "found terminator");
                self.seek_unaligned(end)?;
                return Ok(res);
            }
            res.extend_from_slice(&chunk[..n]);
            if n < SCAN_CHUNK {
                if eos_error {
                    return Err(Error::EndOfStream {
                        requested: res.len() as u64 + 1,
                        available: res.len() as u64,
                    });
                }
                return Ok(res);
            }
        }
    }

    /// Reads bytes up to the multi-byte terminator `term`.
    ///
    /// The medium is scanned in units of `term.len()` bytes, and the
    /// terminator is recognized only when it fills a whole unit. Flags
    /// behave as in [`read_bytes_term`](Stream::read_bytes_term); when the
    /// medium ends before a terminator is found and `eos_error` is false,
    /// the trailing partial unit is part of the result.
    pub fn read_bytes_term_multi(
        &mut self,
        term: &[u8],
        include_term: bool,
        consume_term: bool,
        eos_error: bool,
    ) -> Result<Vec<u8>> {
        if term.is_empty() {
            return Err(Error::InvalidSize {
                context: "terminator length",
                size: 0,
            });
        }
        self.drop_read_bits()?;
        let start = self.pos()?;
        let mut res = Vec::new();
        let mut unit = vec![0u8; term.len()];
        loop {
            let n = self.read_up_to(&mut unit)?;
            if n < unit.len() {
                if eos_error {
                    return Err(Error::EndOfStream {
                        requested: unit.len() as u64,
                        available: n as u64,
                    });
                }
                res.extend_from_slice(&unit[..n]);
                return Ok(res);
            }
            if unit == term {
                let mut end = start + res.len() as u64;
                if consume_term {
                    end += term.len() as u64;
                }
                if include_term {
                    res.extend_from_slice(term);
                }
                if !consume_term {
                    self.seek_unaligned(end)?;
                }
                return Ok(res);
            }
            res.extend_from_slice(&unit);
        }
    }
}

impl<M: Write> Stream<M> {
    /// Writes `buf` as a field of exactly `size` bytes: the content, then,
    /// if there is room left, the terminator `term` followed by `pad` bytes.
    ///
    /// Fails with [`Error::SizeExceeded`], writing nothing, if `buf` is
    /// longer than `size`.
    pub fn write_bytes_limit(&mut self, buf: &[u8], size: u64, term: u8, pad: u8) -> Result<()> {
        let given = buf.len() as u64;
        if given > size {
            return Err(Error::SizeExceeded { size, given });
        }
        self.write_bytes(buf)?;
        if given < size {
            self.write_u1(term)?;
            let padding = size - given - 1;
            copy(&mut repeat(pad).take(padding), &mut self.medium)
                .map_err(|e| Error::io("write", padding, e))?;
        }
        Ok(())
    }

    /// Writes `buf` followed by the (possibly multi-byte) terminator `term`.
    pub fn write_bytes_term(&mut self, buf: &[u8], term: &[u8]) -> Result<()> {
        self.write_bytes(buf)?;
        self.write_all_unaligned(term)
    }
}
