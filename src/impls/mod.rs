/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The [`Stream`] and its operations.

A [`Stream`] wraps any medium implementing [`std::io::Read`],
[`std::io::Write`] and [`std::io::Seek`] (a file, a
[`std::io::Cursor`] over a vector or a slice, etc.), and its methods are
split by concern among the submodules of this module:

- fixed-width integers and floats, raw byte runs, positioning and size
  are implemented in the module defining [`Stream`];
- unaligned big-endian and little-endian bit fields
  ([`read_bits_int_be`](Stream::read_bits_int_be),
  [`write_bits_int_le`](Stream::write_bits_int_le), etc.);
- byte runs delimited by terminators and padding
  ([`read_bytes_term`](Stream::read_bytes_term),
  [`write_bytes_limit`](Stream::write_bytes_limit), etc.);
- the [write-back](Stream::add_child) of child streams.

If several streams must operate on the same medium, wrap it in a
[`SharedMedium`] and obtain further streams with [`Stream::share`].

*/

mod stream;
pub use stream::Stream;

pub(crate) mod bits;

mod terminated;

pub(crate) mod write_back;
pub use write_back::{ChildId, WriteBackHandler};

mod shared;
pub use shared::SharedMedium;
