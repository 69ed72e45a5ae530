/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::TextCodec;

/// The UTF-8 codec. Decoding fails on malformed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8;

impl TextCodec for Utf8 {
    type Error = core::str::Utf8Error;

    fn decode(&self, bytes: &[u8]) -> Result<String, Self::Error> {
        core::str::from_utf8(bytes).map(str::to_owned)
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, Self::Error> {
        Ok(text.as_bytes().to_vec())
    }
}

/// Text that cannot be represented in, or decoded from, an
/// [`encoding_rs`] encoding.
#[cfg(feature = "encoding")]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed text for encoding {encoding}")]
pub struct MalformedText {
    pub encoding: &'static str,
}

/// Decoding never strips or sniffs a byte-order mark, and fails instead of
/// inserting replacement characters. Encoding fails on unmappable
/// characters, and for encodings (such as UTF-16) that
/// [`encoding_rs`] can only decode.
#[cfg(feature = "encoding")]
impl TextCodec for &'static encoding_rs::Encoding {
    type Error = MalformedText;

    fn decode(&self, bytes: &[u8]) -> Result<String, MalformedText> {
        encoding_rs::Encoding::decode_without_bom_handling_and_without_replacement(self, bytes)
            .map(|text| text.into_owned())
            .ok_or(MalformedText {
                encoding: self.name(),
            })
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>, MalformedText> {
        let (bytes, used, had_errors) = encoding_rs::Encoding::encode(self, text);
        if had_errors || used != *self {
            return Err(MalformedText {
                encoding: self.name(),
            });
        }
        Ok(bytes.into_owned())
    }
}
