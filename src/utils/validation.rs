/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Validation operators for decoded values, and consistency checks for values
about to be serialized.

A generated parser captures a [`Location`] (the source path of the field
and the current position of the stream, see [`Stream::location`]) and
passes it to one of the `ensure_*` functions, which return a
[`ValidationError`] if the check fails. No function in this module touches
the stream.

```
use kaitai_stream::prelude::*;
use std::io::Cursor;

let mut stream = Stream::new(Cursor::new(b"PK\x05".to_vec()));
let magic = stream.read_bytes(2)?;
ensure_eq(stream.location("/seq/0")?, &b"PK"[..], &magic[..])?;
let version = stream.read_u1()?;
let err = ensure_max(stream.location("/seq/1")?, &4, &version).unwrap_err();
assert_eq!(
    err.to_string(),
    "/seq/1: at pos 3: validation failed: not in range, max 4, but got 5"
);
# Ok::<(), kaitai_stream::error::Error>(())
```

*/

use core::fmt::Debug;
use std::io::Seek;

use crate::error::{Error, Result, ValidationError, ValidationKind};
use crate::impls::Stream;

/// The field being validated: its source path and, if known, the position
/// of the stream at the time of the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub src_path: &'a str,
    pub pos: Option<u64>,
}

impl<'a> Location<'a> {
    pub fn new(src_path: &'a str, pos: Option<u64>) -> Self {
        Self { src_path, pos }
    }

    fn fail(self, kind: ValidationKind) -> ValidationError {
        ValidationError {
            src_path: self.src_path.to_owned(),
            pos: self.pos,
            kind,
        }
    }
}

impl<M: Seek> Stream<M> {
    /// Returns the location of a field at the current position.
    pub fn location<'a>(&mut self, src_path: &'a str) -> Result<Location<'a>> {
        Ok(Location::new(src_path, Some(self.pos()?)))
    }
}

#[inline]
fn show<T: Debug + ?Sized>(value: &T) -> String {
    format!("{:?}", value)
}

/// Checks that `actual` is equal to `expected`.
pub fn ensure_eq<T: PartialEq + Debug + ?Sized>(
    loc: Location<'_>,
    expected: &T,
    actual: &T,
) -> Result<(), ValidationError> {
    if actual == expected {
        return Ok(());
    }
    Err(loc.fail(ValidationKind::NotEqual {
        expected: show(expected),
        actual: show(actual),
    }))
}

/// Checks that `actual` is not less than `min`.
pub fn ensure_min<T: PartialOrd + Debug + ?Sized>(
    loc: Location<'_>,
    min: &T,
    actual: &T,
) -> Result<(), ValidationError> {
    if actual >= min {
        return Ok(());
    }
    Err(loc.fail(ValidationKind::LessThan {
        min: show(min),
        actual: show(actual),
    }))
}

/// Checks that `actual` is not greater than `max`.
pub fn ensure_max<T: PartialOrd + Debug + ?Sized>(
    loc: Location<'_>,
    max: &T,
    actual: &T,
) -> Result<(), ValidationError> {
    if actual <= max {
        return Ok(());
    }
    Err(loc.fail(ValidationKind::GreaterThan {
        max: show(max),
        actual: show(actual),
    }))
}

/// Checks that `actual` is one of `allowed`.
pub fn ensure_any_of<T: PartialEq + Debug>(
    loc: Location<'_>,
    allowed: &[T],
    actual: &T,
) -> Result<(), ValidationError> {
    if allowed.contains(actual) {
        return Ok(());
    }
    Err(loc.fail(ValidationKind::NotAnyOf {
        actual: show(actual),
    }))
}

/// Converts the raw value `actual` into the enum `E`, failing if it does not
/// correspond to any variant.
pub fn ensure_in_enum<E, R>(loc: Location<'_>, actual: R) -> Result<E, ValidationError>
where
    E: TryFrom<R>,
    R: Debug + Clone,
{
    E::try_from(actual.clone()).map_err(|_| {
        loc.fail(ValidationKind::NotInEnum {
            actual: show(&actual),
        })
    })
}

/// Checks the outcome `holds` of a validation expression evaluated on
/// `actual`.
pub fn ensure_expr<T: Debug + ?Sized>(
    loc: Location<'_>,
    holds: bool,
    actual: &T,
) -> Result<(), ValidationError> {
    if holds {
        return Ok(());
    }
    Err(loc.fail(ValidationKind::ExprMismatch {
        actual: show(actual),
    }))
}

/// Checks, before serialization, that `actual` is consistent with the
/// value `expected` it is derived from; `id` names the checked field.
pub fn check_consistency<T: PartialEq + Debug + ?Sized>(
    id: &str,
    expected: &T,
    actual: &T,
) -> Result<()> {
    if actual == expected {
        return Ok(());
    }
    Err(Error::Consistency {
        id: id.to_owned(),
        expected: show(expected),
        actual: show(actual),
    })
}
