/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Errors returned by streams and by the validation helpers.

Every fallible operation of this crate returns [`Result`], whose error type
is the closed [`Error`] enum. Validation failures are reported through the
[`ValidationError`] record, which is also usable on its own by code that
validates values without a stream at hand.

*/

use core::fmt::{Display, Formatter};

use crate::traits::BitOrder;
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

/// Alias for results of stream operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The error type of stream operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Fewer bytes than requested were left in the medium (or, when
    /// writing, there was no room left for them).
    #[error("requested {requested} bytes, but only {available} bytes available")]
    EndOfStream { requested: u64, available: u64 },

    /// A size or width is outside of its legal domain: a negative byte
    /// count, a bit width larger than 64, an unsupported rotation group.
    #[error("invalid size {size} for {context}")]
    InvalidSize { context: &'static str, size: i64 },

    /// The byte order of a value was supposed to be computed, but no
    /// decision was available.
    #[error("undecided endianness")]
    UndecidedByteOrder,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A value about to be serialized is inconsistent with another one it
    /// depends upon (e.g., a length field and the length of its body).
    #[error("check failed: {id}, expected: {expected}, actual: {actual}")]
    Consistency {
        id: String,
        expected: String,
        actual: String,
    },

    /// A bit operation was requested while bits of another direction or
    /// order were still pending.
    #[error("cannot switch from {from} to {to} with {pending} unaligned bits pending")]
    BitModeSwitch {
        pending: u32,
        from: BitMode,
        to: BitMode,
    },

    /// The stream was moved or read while written bits were not yet flushed.
    #[error("{pending} written bits are not flushed; align the stream first")]
    UnflushedBits { pending: u32 },

    /// With feature `checks`, a value does not fit the requested bit width.
    #[error("value {value} does not fit in {bits} bits")]
    ValueTooWide { value: u64, bits: u32 },

    /// Content of a fixed-size delimited field is larger than the field.
    #[error("writing {size} bytes, but {given} bytes were given")]
    SizeExceeded { size: u64, given: u64 },

    /// A failure of the underlying medium.
    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wraps a medium error, turning premature ends into [`Error::EndOfStream`].
    pub(crate) fn io(op: &'static str, requested: u64, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::WriteZero => {
                Error::EndOfStream {
                    requested,
                    available: 0,
                }
            }
            _ => Error::Io { op, source },
        }
    }
}

/// Direction and order of the bits currently held by a stream's bit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
pub enum BitMode {
    Read(BitOrder),
    Write(BitOrder),
}

impl Display for BitMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            BitMode::Read(order) => write!(f, "{} bit reads", order),
            BitMode::Write(order) => write!(f, "{} bit writes", order),
        }
    }
}

/// A decoded value that failed a declared constraint.
///
/// The record is built at the point of failure and carries the source path
/// of the failing field (a slash-delimited locator such as `/seq/0`), the
/// byte position of the stream at that moment, if known, and the offending
/// values rendered with their [`Debug`](core::fmt::Debug) representation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationError {
    pub src_path: String,
    pub pos: Option<u64>,
    pub kind: ValidationKind,
}

/// The constraint violated by a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationKind {
    NotEqual { expected: String, actual: String },
    LessThan { min: String, actual: String },
    GreaterThan { max: String, actual: String },
    NotAnyOf { actual: String },
    NotInEnum { actual: String },
    ExprMismatch { actual: String },
}

impl Display for ValidationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ValidationKind::NotEqual { expected, actual } => {
                write!(f, "not equal, expected {}, but got {}", expected, actual)
            }
            ValidationKind::LessThan { min, actual } => {
                write!(f, "not in range, min {}, but got {}", min, actual)
            }
            ValidationKind::GreaterThan { max, actual } => {
                write!(f, "not in range, max {}, but got {}", max, actual)
            }
            ValidationKind::NotAnyOf { actual } => write!(f, "not any of the list, got {}", actual),
            ValidationKind::NotInEnum { actual } => write!(f, "not in the enum, got {}", actual),
            ValidationKind::ExprMismatch { actual } => {
                write!(f, "not matching the expression, got {}", actual)
            }
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: ", self.src_path)?;
        if let Some(pos) = self.pos {
            write!(f, "at pos {}: ", pos)?;
        }
        write!(f, "validation failed: {}", self.kind)
    }
}

impl core::error::Error for ValidationError {}
