/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Helpers called by generated code around stream operations.

- Byte-array and string helpers, such as [`bytes_terminate`] and
  [`string_reverse`].
- Byte transforms, both as functions (e.g., [`process_xor_many`]) and as
  [`Process`](crate::traits::Process) implementations ([`Xor`],
  [`Rotate`] and, with feature `zlib`, `Zlib`).
- Text codecs for [`TextCodec`](crate::traits::TextCodec): [`Utf8`] and,
  with feature `encoding`, every [`encoding_rs`](https://docs.rs/encoding_rs)
  encoding.
- Validation operators ([`ensure_eq`] and friends) and
  [`check_consistency`].

*/

mod bytes;
pub use bytes::*;

mod process;
pub use process::*;

mod text;
pub use text::*;

pub mod validation;
pub use validation::*;
