/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Traits

*/

mod endianness;
pub use endianness::*;

mod encoded_len;
pub use encoded_len::*;

mod process;
pub use process::*;

mod text;
pub use text::*;
