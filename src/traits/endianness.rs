/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use core::fmt::{Display, Formatter};

use crate::error::{Error, Result};
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

/// Inner private trait used to make implementing [`Endianness`]
/// impossible for other structs.
mod private {
    /// This is a [SealedTrait](https://predr.ag/blog/definitive-guide-to-sealed-traits-in-rust/).
    pub trait Sealed {}
}

/// Marker trait for endianness selector types.
///
/// Its only implementations are [`LittleEndian`] and [`BigEndian`]. The same
/// selector is used for the byte order of fixed-width values and for the bit
/// order of packed bit fields: with [`BigEndian`] bits are consumed from the
/// most significant bit of each byte, with [`LittleEndian`] from the least
/// significant one.
pub trait Endianness: private::Sealed + 'static {
    /// The name of the endianness.
    const NAME: &'static str;
    /// The runtime counterpart of this selector.
    const ORDER: ByteOrder;
}

/// Selector type for little-endian streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LittleEndian;

/// Selector type for big-endian streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigEndian;

/// Alias for [`BigEndian`]
pub type BE = BigEndian;

/// Alias for [`LittleEndian`]
pub type LE = LittleEndian;

impl private::Sealed for LittleEndian {}
impl private::Sealed for BigEndian {}

impl Endianness for LittleEndian {
    const NAME: &'static str = "little";
    const ORDER: ByteOrder = ByteOrder::Little;
}

impl Endianness for BigEndian {
    const NAME: &'static str = "big";
    const ORDER: ByteOrder = ByteOrder::Big;
}

/// Runtime byte (or bit) order, for formats whose endianness is only known
/// once some other field has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    Big,
    Little,
}

/// Alias for [`ByteOrder`] when it qualifies packed bit fields.
pub type BitOrder = ByteOrder;

impl ByteOrder {
    /// Returns the decided order, or [`Error::UndecidedByteOrder`] if the
    /// field selecting it did not produce one.
    pub fn resolve(order: Option<ByteOrder>) -> Result<ByteOrder> {
        order.ok_or(Error::UndecidedByteOrder)
    }

    #[inline(always)]
    pub fn is_big(self) -> bool {
        self == ByteOrder::Big
    }
}

impl Display for ByteOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteOrder::Big => f.write_str("big-endian"),
            ByteOrder::Little => f.write_str("little-endian"),
        }
    }
}
