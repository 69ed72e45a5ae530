/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use num_traits::{FromBytes, ToBytes};
use tracing::trace;

use crate::error::{BitMode, Error, Result};
use crate::impls::bits::BitBuffer;
use crate::impls::write_back::WriteBackNode;
use crate::traits::*;

/// A cursor over a seekable medium, providing the primitive reads and
/// writes used by generated parsers and serializers.
///
/// The medium is any type implementing [`Read`], [`Write`] and/or [`Seek`]
/// (a [`std::fs::File`], a [`std::io::Cursor`], etc.): read operations are
/// available when the medium is [`Read`], write operations when it is
/// [`Write`], and positioning operations when it is [`Seek`]. The current
/// position is always the position of the medium.
///
/// Besides the medium, a stream owns a bit buffer holding at most seven
/// bits left over by the last unaligned bit operation (see
/// [`read_bits_int_be`](Stream::read_bits_int_be) and friends), and the
/// list of child streams registered for [write-back](Stream::add_child).
///
/// # Example
/// ```
/// use kaitai_stream::prelude::*;
/// use std::io::Cursor;
///
/// let mut stream = Stream::new(Cursor::new(vec![0x12, 0x34, 0xA0]));
/// assert_eq!(stream.read_u2be()?, 0x1234);
/// assert_eq!(stream.read_bits_int_be(3)?, 0b101);
/// # Ok::<(), kaitai_stream::error::Error>(())
/// ```
pub struct Stream<M> {
    /// The medium we read from and write to.
    pub(crate) medium: M,
    /// Bits left over by unaligned bit operations.
    pub(crate) bits: BitBuffer,
    /// Child streams waiting for [`write_back_children`](Stream::write_back_children).
    /// Slots are emptied as children are flushed, so that indices stay valid.
    pub(crate) children: Vec<Option<Box<dyn WriteBackNode<M>>>>,
}

impl<M: core::fmt::Debug> core::fmt::Debug for Stream<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stream")
            .field("medium", &self.medium)
            .field("bits", &self.bits)
            .field("children", &self.children.iter().flatten().count())
            .finish()
    }
}

impl<M> Stream<M> {
    /// Create a new [`Stream`] around a medium.
    #[must_use]
    pub fn new(medium: M) -> Self {
        Self {
            medium,
            bits: BitBuffer::default(),
            children: Vec::new(),
        }
    }

    /// Returns a reference to the medium.
    pub fn get_ref(&self) -> &M {
        &self.medium
    }

    /// Returns a mutable reference to the medium.
    ///
    /// Moving the medium behind the back of the stream while bits are
    /// pending leads to unspecified results.
    pub fn get_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    /// Returns the medium, dropping pending bits and unflushed children.
    pub fn into_inner(self) -> M {
        self.medium
    }

    /// Returns the number of bits left over by the last unaligned bit
    /// operation (in `0..8`).
    #[inline(always)]
    #[must_use]
    pub fn bits_left(&self) -> u32 {
        self.bits.bits_left
    }

    /// Discards any pending bit state, so that the next bit operation
    /// starts at a byte boundary.
    ///
    /// Leftover read bits are dropped; on a writing stream use
    /// [`write_align_to_byte`](Stream::write_align_to_byte), which
    /// flushes them instead.
    #[inline(always)]
    pub fn align_to_byte(&mut self) {
        self.bits.clear();
    }

    /// Drops leftover read bits before a byte-level read or a seek.
    ///
    /// Pending written bits would be lost, so they are an error.
    pub(crate) fn drop_read_bits(&mut self) -> Result<()> {
        if let Some(BitMode::Write(_)) = self.bits.mode {
            if self.bits.bits_left > 0 {
                return Err(Error::UnflushedBits {
                    pending: self.bits.bits_left,
                });
            }
        }
        self.bits.clear();
        Ok(())
    }
}

impl<M: Seek> Stream<M> {
    /// Returns the current byte position.
    pub fn pos(&mut self) -> Result<u64> {
        self.medium
            .stream_position()
            .map_err(|e| Error::io("tell", 0, e))
    }

    /// Moves to byte position `pos`, discarding leftover read bits.
    ///
    /// Fails with [`Error::UnflushedBits`] if written bits are pending:
    /// flush them with [`write_align_to_byte`](Stream::write_align_to_byte)
    /// first.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.drop_read_bits()?;
        self.seek_unaligned(pos)
    }

    #[inline]
    pub(crate) fn seek_unaligned(&mut self, pos: u64) -> Result<()> {
        self.medium
            .seek(SeekFrom::Start(pos))
            .map_err(|e| Error::io("seek", 0, e))?;
        Ok(())
    }

    /// Returns the size of the medium in bytes.
    ///
    /// The size is computed by seeking to the end of the medium and back.
    /// Seeking back is attempted even if seeking to the end failed; if
    /// seeking back fails, the error is returned and the position is left
    /// wherever the medium left it.
    pub fn size(&mut self) -> Result<u64> {
        let pos = self.pos()?;
        let end = self.medium.seek(SeekFrom::End(0));
        let back = self.medium.seek(SeekFrom::Start(pos));
        let end = end.map_err(|e| Error::io("seek to end", 0, e))?;
        back.map_err(|e| Error::io("seek back", 0, e))?;
        trace!(pos, size = end, "probed medium size");
        Ok(end)
    }

    /// Returns whether the stream is exhausted.
    ///
    /// A stream holding leftover read bits is never at its end.
    pub fn is_eof(&mut self) -> Result<bool> {
        if let Some(BitMode::Read(_)) = self.bits.mode {
            if self.bits.bits_left > 0 {
                return Ok(false);
            }
        }
        Ok(self.pos()? >= self.size()?)
    }
}

impl<M: Read> Stream<M> {
    /// Fill `buf` from the medium, ignoring the bit buffer.
    pub(crate) fn read_exact_unaligned(&mut self, buf: &mut [u8]) -> Result<()> {
        let filled = self.read_up_to(buf)?;
        if filled < buf.len() {
            return Err(Error::EndOfStream {
                requested: buf.len() as u64,
                available: filled as u64,
            });
        }
        Ok(())
    }

    /// Read into `buf` until it is full or the medium is exhausted, and
    /// return the number of bytes read.
    pub(crate) fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.medium.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io("read", buf.len() as u64, e)),
            }
        }
        Ok(filled)
    }

    /// Reads a fixed-width primitive in the given byte order.
    ///
    /// Leftover read bits are discarded first; pending written bits make
    /// the read fail with [`Error::UnflushedBits`]. If the medium ends
    /// early, the bytes that were available are consumed.
    pub fn read_ordered<T: FromBytes>(&mut self, order: ByteOrder) -> Result<T>
    where
        T::Bytes: Sized + Default,
    {
        self.drop_read_bits()?;
        let mut bytes = T::Bytes::default();
        self.read_exact_unaligned(bytes.as_mut())?;
        Ok(match order {
            ByteOrder::Big => T::from_be_bytes(&bytes),
            ByteOrder::Little => T::from_le_bytes(&bytes),
        })
    }

    /// Reads a fixed-width primitive in the byte order selected by `E`.
    #[inline(always)]
    pub fn read<T: FromBytes, E: Endianness>(&mut self) -> Result<T>
    where
        T::Bytes: Sized + Default,
    {
        self.read_ordered::<T>(E::ORDER)
    }

    /// Reads exactly `n` bytes.
    ///
    /// A negative `n` fails with [`Error::InvalidSize`] without touching
    /// the stream. A short read fails with [`Error::EndOfStream`] after
    /// consuming the rest of the medium.
    pub fn read_bytes(&mut self, n: i64) -> Result<Vec<u8>> {
        let requested = u64::try_from(n).map_err(|_| Error::InvalidSize {
            context: "byte count",
            size: n,
        })?;
        self.drop_read_bits()?;
        let mut buf = Vec::new();
        self.medium
            .by_ref()
            .take(requested)
            .read_to_end(&mut buf)
            .map_err(|e| Error::io("read", requested, e))?;
        if (buf.len() as u64) < requested {
            return Err(Error::EndOfStream {
                requested,
                available: buf.len() as u64,
            });
        }
        Ok(buf)
    }

    /// Reads all the bytes up to the end of the medium.
    pub fn read_bytes_full(&mut self) -> Result<Vec<u8>> {
        self.drop_read_bits()?;
        let mut buf = Vec::new();
        self.medium
            .read_to_end(&mut buf)
            .map_err(|e| Error::io("read to end", 0, e))?;
        Ok(buf)
    }
}

impl<M: Read + Seek> Stream<M> {
    /// Returns the whole content of the medium, leaving the position (and
    /// the bit buffer) untouched.
    pub fn to_byte_array(&mut self) -> Result<Vec<u8>> {
        let pos = self.pos()?;
        let mut buf = Vec::new();
        let read = self
            .medium
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.medium.read_to_end(&mut buf));
        let back = self.medium.seek(SeekFrom::Start(pos));
        read.map_err(|e| Error::io("read to end", 0, e))?;
        back.map_err(|e| Error::io("seek back", 0, e))?;
        Ok(buf)
    }
}

impl<M: Write> Stream<M> {
    /// Write `buf` to the medium, ignoring the bit buffer.
    pub(crate) fn write_all_unaligned(&mut self, buf: &[u8]) -> Result<()> {
        self.medium
            .write_all(buf)
            .map_err(|e| Error::io("write", buf.len() as u64, e))
    }

    /// Writes `buf`, flushing pending written bits first.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.write_align_to_byte()?;
        self.write_all_unaligned(buf)
    }

    /// Writes a fixed-width primitive in the given byte order.
    pub fn write_ordered<T: ToBytes>(&mut self, value: T, order: ByteOrder) -> Result<()> {
        let bytes = match order {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
        self.write_bytes(bytes.as_ref())
    }

    /// Writes a fixed-width primitive in the byte order selected by `E`.
    #[inline(always)]
    pub fn write<T: ToBytes, E: Endianness>(&mut self, value: T) -> Result<()> {
        self.write_ordered(value, E::ORDER)
    }

    /// Flushes the medium.
    pub fn flush(&mut self) -> Result<()> {
        self.write_align_to_byte()?;
        self.medium.flush().map_err(|e| Error::io("flush", 0, e))
    }
}

macro_rules! impl_named_primitives {
    ($($read:ident, $write:ident => $ty:ty, $e:ty;)*) => {
        impl<M: Read> Stream<M> {
            $(
                #[doc = concat!("Reads a `", stringify!($ty), "` in ", stringify!($e), " byte order.")]
                #[inline(always)]
                pub fn $read(&mut self) -> Result<$ty> {
                    self.read::<$ty, $e>()
                }
            )*
        }

        impl<M: Write> Stream<M> {
            $(
                #[doc = concat!("Writes a `", stringify!($ty), "` in ", stringify!($e), " byte order.")]
                #[inline(always)]
                pub fn $write(&mut self, value: $ty) -> Result<()> {
                    self.write::<$ty, $e>(value)
                }
            )*
        }
    };
}

impl_named_primitives! {
    read_u1, write_u1 => u8, BE;
    read_s1, write_s1 => i8, BE;
    read_u2be, write_u2be => u16, BE;
    read_u4be, write_u4be => u32, BE;
    read_u8be, write_u8be => u64, BE;
    read_u2le, write_u2le => u16, LE;
    read_u4le, write_u4le => u32, LE;
    read_u8le, write_u8le => u64, LE;
    read_s2be, write_s2be => i16, BE;
    read_s4be, write_s4be => i32, BE;
    read_s8be, write_s8be => i64, BE;
    read_s2le, write_s2le => i16, LE;
    read_s4le, write_s4le => i32, LE;
    read_s8le, write_s8le => i64, LE;
    read_f4be, write_f4be => f32, BE;
    read_f8be, write_f8be => f64, BE;
    read_f4le, write_f4le => f32, LE;
    read_f8le, write_f8le => f64, LE;
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_primitives() -> Result<()> {
        let data = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
            0x0F, 0x10,
        ];
        let mut s = Stream::new(Cursor::new(&data[..]));
        assert_eq!(s.read_u1()?, 0x01);
        assert_eq!(s.read_u2be()?, 0x0203);
        assert_eq!(s.read_u2le()?, 0x0504);
        assert_eq!(s.read_u4be()?, 0x06070809);
        assert_eq!(s.read_u4le()?, 0x0D0C0B0A);
        assert_eq!(s.pos()?, 13);
        s.seek(0)?;
        assert_eq!(s.read_u8be()?, 0x0102030405060708);
        assert_eq!(s.read_u8le()?, 0x100F0E0D0C0B0A09);
        Ok(())
    }

    #[test]
    fn test_read_signed() -> Result<()> {
        let data = [0xFF, 0xFF, 0xFE, 0x80, 0x00, 0x00, 0x00];
        let mut s = Stream::new(Cursor::new(&data[..]));
        assert_eq!(s.read_s1()?, -1);
        assert_eq!(s.read_s2be()?, -2);
        assert_eq!(s.read_s4le()?, 0x80);
        s.seek(3)?;
        assert_eq!(s.read_s4be()?, i32::MIN);
        Ok(())
    }

    #[test]
    fn test_read_floats() -> Result<()> {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f32.to_be_bytes());
        data.extend_from_slice(&(-2.25f64).to_le_bytes());
        let mut s = Stream::new(Cursor::new(data));
        assert_eq!(s.read_f4be()?, 1.5);
        assert_eq!(s.read_f8le()?, -2.25);
        Ok(())
    }

    #[test]
    fn test_end_of_stream() -> Result<()> {
        let mut s = Stream::new(Cursor::new(&[1u8, 2, 3][..]));
        assert!(matches!(
            s.read_u4be(),
            Err(Error::EndOfStream {
                requested: 4,
                available: 3
            })
        ));
        // the available bytes are consumed
        assert_eq!(s.pos()?, 3);

        s.seek(0)?;
        assert!(matches!(
            s.read_bytes(5),
            Err(Error::EndOfStream {
                requested: 5,
                available: 3
            })
        ));
        assert_eq!(s.pos()?, 3);
        Ok(())
    }

    #[test]
    fn test_read_bytes() -> Result<()> {
        let mut s = Stream::new(Cursor::new(b"fooo".to_vec()));
        assert!(matches!(
            s.read_bytes(-2),
            Err(Error::InvalidSize { size: -2, .. })
        ));
        assert_eq!(s.pos()?, 0);
        assert_eq!(s.read_bytes(0)?, b"");
        assert_eq!(s.read_bytes(3)?, b"foo");
        assert!(matches!(
            s.read_bytes(2),
            Err(Error::EndOfStream {
                requested: 2,
                available: 1
            })
        ));
        Ok(())
    }

    #[test]
    fn test_read_bytes_full() -> Result<()> {
        let mut s = Stream::new(Cursor::new(b"foo bar".to_vec()));
        s.read_bytes(4)?;
        assert_eq!(s.read_bytes_full()?, b"bar");
        assert_eq!(s.read_bytes_full()?, b"");
        Ok(())
    }

    #[test]
    fn test_size_restores_position() -> Result<()> {
        let mut s = Stream::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(s.size()?, 0);
        assert_eq!(s.pos()?, 0);
        assert!(s.is_eof()?);

        let mut s = Stream::new(Cursor::new(vec![0u8; 10]));
        s.seek(3)?;
        assert_eq!(s.size()?, 10);
        assert_eq!(s.pos()?, 3);
        assert!(!s.is_eof()?);
        s.seek(10)?;
        assert!(s.is_eof()?);
        Ok(())
    }

    /// A medium that cannot seek relative to its end.
    struct NoEnd(Cursor<Vec<u8>>);

    impl Seek for NoEnd {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            match pos {
                SeekFrom::End(_) => Err(std::io::Error::other("no end")),
                _ => self.0.seek(pos),
            }
        }
    }

    #[test]
    fn test_size_failure() -> Result<()> {
        let mut s = Stream::new(NoEnd(Cursor::new(vec![0u8; 8])));
        s.seek(5)?;
        assert!(matches!(
            s.size(),
            Err(Error::Io {
                op: "seek to end",
                ..
            })
        ));
        assert_eq!(s.pos()?, 5);
        assert!(s.is_eof().is_err());
        Ok(())
    }

    #[test]
    fn test_eof_with_pending_bits() -> Result<()> {
        let mut s = Stream::new(Cursor::new(vec![0xFFu8]));
        s.read_bits_int_be(3)?;
        assert!(!s.is_eof()?);
        s.read_bits_int_be(5)?;
        assert!(s.is_eof()?);
        Ok(())
    }

    #[test]
    fn test_write_primitives() -> Result<()> {
        let mut s = Stream::new(Cursor::new(Vec::new()));
        s.write_u1(0x01)?;
        s.write_u2be(0x0203)?;
        s.write_u2le(0x0504)?;
        s.write_s4be(-1)?;
        s.write_f4le(1.0)?;
        s.write_ordered(0x0A0Bu16, ByteOrder::Little)?;
        assert_eq!(
            s.into_inner().into_inner(),
            vec![
                0x01, 0x02, 0x03, 0x04, 0x05, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x80, 0x3F, 0x0B,
                0x0A
            ]
        );
        Ok(())
    }

    #[test]
    fn test_write_fixed_medium() -> Result<()> {
        let mut buf = [0u8; 3];
        let mut s = Stream::new(Cursor::new(&mut buf[..]));
        s.write_u2be(0xABCD)?;
        assert!(matches!(s.write_u2be(1), Err(Error::EndOfStream { .. })));
        Ok(())
    }

    #[test]
    fn test_to_byte_array() -> Result<()> {
        let mut s = Stream::new(Cursor::new(b"abcdef".to_vec()));
        s.seek(2)?;
        assert_eq!(s.to_byte_array()?, b"abcdef");
        assert_eq!(s.pos()?, 2);
        Ok(())
    }

    #[test]
    fn test_seek_with_unflushed_bits() -> Result<()> {
        let mut s = Stream::new(Cursor::new(Vec::new()));
        s.write_bits_int_be(3, 0b101)?;
        assert!(matches!(s.seek(0), Err(Error::UnflushedBits { pending: 3 })));
        s.write_align_to_byte()?;
        s.seek(0)?;
        assert_eq!(s.read_u1()?, 0b1010_0000);
        Ok(())
    }

    #[test]
    fn test_read_with_unflushed_bits() -> Result<()> {
        let mut s = Stream::new(Cursor::new(vec![0xAA, 0xBB]));
        s.write_bits_int_be(3, 0b111)?;
        assert!(matches!(s.read_u1(), Err(Error::UnflushedBits { pending: 3 })));
        assert!(matches!(s.read_bytes(1), Err(Error::UnflushedBits { .. })));
        assert!(matches!(s.read_bytes_full(), Err(Error::UnflushedBits { .. })));
        assert_eq!(s.pos()?, 0);
        s.write_align_to_byte()?;
        assert_eq!(s.read_u1()?, 0xBB);
        assert_eq!(s.into_inner().into_inner(), [0b1110_0000, 0xBB]);
        Ok(())
    }
}
