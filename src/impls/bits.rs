/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Unaligned bit reads and writes.

Bit fields are packed in bytes either starting from the most significant bit
(big-endian bit order) or from the least significant bit (little-endian bit
order). Consecutive bit operations of the same order behave as if the bytes
of the medium were a single continuous bit stream: the bits of a byte that
are not consumed by an operation are kept in a buffer of at most seven bits
and used by the next operation.

The buffer is emptied by [`Stream::align_to_byte`] (leftover read bits are
discarded) and [`Stream::write_align_to_byte`] (leftover written bits are
flushed as a zero-padded byte).

Switching direction or bit order while bits are pending fails with
[`Error::BitModeSwitch`]: align the stream first.

*/

use std::io::{Read, Write};

use crate::error::{BitMode, Error, Result};
use crate::impls::Stream;
use crate::traits::*;

/// The bits left over by the last unaligned bit operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BitBuffer {
    /// The leftover bits, in the lowest `bits_left` bits.
    pub(crate) bits: u64,
    /// Number of valid bits in `bits`. It is always smaller than 8.
    pub(crate) bits_left: u32,
    /// What produced the leftover bits; `None` after an alignment.
    pub(crate) mode: Option<BitMode>,
}

impl BitBuffer {
    /// Claims the buffer for `mode`.
    fn enter(&mut self, mode: BitMode) -> Result<()> {
        match self.mode {
            Some(current) if current != mode && self.bits_left > 0 => Err(Error::BitModeSwitch {
                pending: self.bits_left,
                from: current,
                to: mode,
            }),
            _ => {
                self.mode = Some(mode);
                Ok(())
            }
        }
    }

    #[inline(always)]
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Returns a mask of the lowest `n` bits, with `n` at most 64.
#[inline(always)]
const fn mask(n: u32) -> u64 {
    if n >= 64 { u64::MAX } else { (1 << n) - 1 }
}

#[inline(always)]
fn check_width(n: u32) -> Result<()> {
    if n > 64 {
        return Err(Error::InvalidSize {
            context: "bit width",
            size: n as i64,
        });
    }
    Ok(())
}

/// Applies the width of a bit field to the value to write.
#[inline(always)]
fn fit(value: u64, n: u32) -> Result<u64> {
    #[cfg(feature = "checks")]
    if value & mask(n) != value {
        return Err(Error::ValueTooWide { value, bits: n });
    }
    Ok(value & mask(n))
}

impl<M: Read> Stream<M> {
    /// Read the fresh bytes needed to provide `needed` more bits.
    fn fetch_bits(&mut self, needed: u32) -> Result<([u8; 8], usize)> {
        let bytes_needed = needed.div_ceil(8) as usize;
        if bytes_needed > 8 {
            return Err(Error::InvalidSize {
                context: "bit fetch",
                size: bytes_needed as i64,
            });
        }
        let mut buf = [0u8; 8];
        self.read_exact_unaligned(&mut buf[..bytes_needed])?;
        Ok((buf, bytes_needed))
    }

    /// Reads an `n`-bit unsigned integer in big-endian bit order, with `n`
    /// at most 64.
    ///
    /// The result is made of the most significant leftover bits first,
    /// followed by the bits of the next bytes, from the most significant
    /// one.
    pub fn read_bits_int_be(&mut self, n: u32) -> Result<u64> {
        check_width(n)?;
        if n == 0 {
            return Ok(0);
        }
        self.bits.enter(BitMode::Read(BitOrder::Big))?;

        let left = self.bits.bits_left;
        if n <= left {
            let remaining = left - n;
            let res = self.bits.bits >> remaining;
            self.bits.bits &= mask(remaining);
            self.bits.bits_left = remaining;
            return Ok(res);
        }

        let needed = n - left;
        let (buf, bytes_needed) = self.fetch_bits(needed)?;
        let fresh = buf[..bytes_needed]
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64);
        let new_left = bytes_needed as u32 * 8 - needed;
        let combined = ((self.bits.bits as u128) << (bytes_needed * 8)) | fresh as u128;

        self.bits.bits = fresh & mask(new_left);
        self.bits.bits_left = new_left;
        Ok((combined >> new_left) as u64)
    }

    /// Reads an `n`-bit unsigned integer in little-endian bit order, with
    /// `n` at most 64.
    ///
    /// The leftover bits are the least significant bits of the result,
    /// followed by the bits of the next bytes, from the least significant
    /// one.
    pub fn read_bits_int_le(&mut self, n: u32) -> Result<u64> {
        check_width(n)?;
        if n == 0 {
            return Ok(0);
        }
        self.bits.enter(BitMode::Read(BitOrder::Little))?;

        let left = self.bits.bits_left;
        if n <= left {
            let res = self.bits.bits & mask(n);
            self.bits.bits >>= n;
            self.bits.bits_left = left - n;
            return Ok(res);
        }

        let needed = n - left;
        let (buf, bytes_needed) = self.fetch_bits(needed)?;
        let fresh = buf[..bytes_needed]
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &byte)| acc | (byte as u64) << (8 * i));
        let new_left = bytes_needed as u32 * 8 - needed;
        let combined = ((fresh as u128) << left) | self.bits.bits as u128;

        self.bits.bits = (combined >> n) as u64 & mask(new_left);
        self.bits.bits_left = new_left;
        Ok(combined as u64 & mask(n))
    }

    /// Reads an `n`-bit unsigned integer in the bit order selected by `E`.
    #[inline(always)]
    pub fn read_bits<E: Endianness>(&mut self, n: u32) -> Result<u64> {
        match E::ORDER {
            ByteOrder::Big => self.read_bits_int_be(n),
            ByteOrder::Little => self.read_bits_int_le(n),
        }
    }
}

impl<M: Write> Stream<M> {
    /// Writes the lowest `n` bits of `value` in big-endian bit order, with
    /// `n` at most 64.
    ///
    /// Higher bits of `value` are ignored, unless the feature `checks` is
    /// enabled, in which case they must be zero.
    pub fn write_bits_int_be(&mut self, n: u32, value: u64) -> Result<()> {
        check_width(n)?;
        let value = fit(value, n)?;
        if n == 0 {
            return Ok(());
        }
        self.bits.enter(BitMode::Write(BitOrder::Big))?;

        let total = self.bits.bits_left + n;
        let full_bytes = (total / 8) as usize;
        let new_left = total % 8;
        let combined = ((self.bits.bits as u128) << n) | value as u128;

        if full_bytes > 0 {
            let out = combined >> new_left;
            let mut buf = [0u8; 9];
            for (i, byte) in buf[..full_bytes].iter_mut().enumerate() {
                *byte = (out >> (8 * (full_bytes - 1 - i))) as u8;
            }
            self.write_all_unaligned(&buf[..full_bytes])?;
        }
        self.bits.bits = combined as u64 & mask(new_left);
        self.bits.bits_left = new_left;
        Ok(())
    }

    /// Writes the lowest `n` bits of `value` in little-endian bit order,
    /// with `n` at most 64.
    ///
    /// Higher bits of `value` are ignored, unless the feature `checks` is
    /// enabled, in which case they must be zero.
    pub fn write_bits_int_le(&mut self, n: u32, value: u64) -> Result<()> {
        check_width(n)?;
        let value = fit(value, n)?;
        if n == 0 {
            return Ok(());
        }
        self.bits.enter(BitMode::Write(BitOrder::Little))?;

        let left = self.bits.bits_left;
        let total = left + n;
        let full_bytes = (total / 8) as usize;
        let new_left = total % 8;
        let combined = ((value as u128) << left) | self.bits.bits as u128;

        if full_bytes > 0 {
            let mut buf = [0u8; 9];
            for (i, byte) in buf[..full_bytes].iter_mut().enumerate() {
                *byte = (combined >> (8 * i)) as u8;
            }
            self.write_all_unaligned(&buf[..full_bytes])?;
        }
        self.bits.bits = (combined >> (8 * full_bytes)) as u64 & mask(new_left);
        self.bits.bits_left = new_left;
        Ok(())
    }

    /// Writes the lowest `n` bits of `value` in the bit order selected by `E`.
    #[inline(always)]
    pub fn write_bits<E: Endianness>(&mut self, n: u32, value: u64) -> Result<()> {
        match E::ORDER {
            ByteOrder::Big => self.write_bits_int_be(n, value),
            ByteOrder::Little => self.write_bits_int_le(n, value),
        }
    }

    /// Flushes pending written bits as a byte padded with zeros (on the
    /// right in big-endian bit order, on the left in little-endian bit
    /// order), and empties the bit buffer.
    ///
    /// Leftover read bits, if any, are discarded.
    pub fn write_align_to_byte(&mut self) -> Result<()> {
        let pending = match self.bits.mode {
            Some(BitMode::Write(order)) if self.bits.bits_left > 0 => Some(match order {
                ByteOrder::Big => (self.bits.bits << (8 - self.bits.bits_left)) as u8,
                ByteOrder::Little => self.bits.bits as u8,
            }),
            _ => None,
        };
        self.bits.clear();
        if let Some(byte) = pending {
            self.write_all_unaligned(&[byte])?;
        }
        Ok(())
    }
}
