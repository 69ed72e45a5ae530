/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use core::error::Error;

/// A reversible transformation of a byte array, applied to the raw bytes
/// of a field before parsing ([`decode`](Process::decode)) and after
/// serialization ([`encode`](Process::encode)).
///
/// Implementations for XOR, bit rotation and zlib are available in
/// [`utils`](crate::utils); custom processors supplied by a format
/// description implement this trait as well.
pub trait Process {
    type Error: Error + Send + Sync + 'static;

    /// Turns stored bytes into the bytes to parse.
    fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// Turns serialized bytes into the bytes to store.
    fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, Self::Error>;
}
