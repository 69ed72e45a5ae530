/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use core::error::Error;

/// Conversion between raw bytes and text.
///
/// The conversion tables are not part of this crate: a codec is supplied by
/// the embedding application (see [`Utf8`](crate::utils::Utf8) and, with
/// feature `encoding`, the implementation for
/// [`encoding_rs::Encoding`](https://docs.rs/encoding_rs)). Failures are
/// reported with the codec's own error type.
pub trait TextCodec {
    type Error: Error + Send + Sync + 'static;

    fn decode(&self, bytes: &[u8]) -> Result<String, Self::Error>;

    fn encode(&self, text: &str) -> Result<Vec<u8>, Self::Error>;
}

/// Decodes `bytes` into a string using `codec`.
#[inline]
pub fn bytes_to_str<C: TextCodec + ?Sized>(bytes: &[u8], codec: &C) -> Result<String, C::Error> {
    codec.decode(bytes)
}

/// Encodes `text` into bytes using `codec`.
#[inline]
pub fn str_to_bytes<C: TextCodec + ?Sized>(text: &str, codec: &C) -> Result<Vec<u8>, C::Error> {
    codec.encode(text)
}
