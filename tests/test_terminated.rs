/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use kaitai_stream::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

#[test]
fn test_fooo() -> Result<()> {
    for include_term in [false, true] {
        for consume_term in [false, true] {
            for eos_error in [false, true] {
                let mut s = Stream::new(Cursor::new(&b"fooo"[..]));
                let res = s.read_bytes_term(b'o', include_term, consume_term, eos_error)?;
                let expected: &[u8] = if include_term { b"fo" } else { b"f" };
                assert_eq!(res, expected);
                assert_eq!(s.pos()?, 1 + consume_term as u64);

                let mut s = Stream::new(Cursor::new(&b"fooo"[..]));
                let res = s.read_bytes_term_multi(b"o", include_term, consume_term, eos_error)?;
                assert_eq!(res, expected);
                assert_eq!(s.pos()?, 1 + consume_term as u64);
            }
        }
    }
    Ok(())
}

#[test]
fn test_not_found() -> Result<()> {
    for include_term in [false, true] {
        for consume_term in [false, true] {
            let mut s = Stream::new(Cursor::new(&b"fooo"[..]));
            assert_eq!(
                s.read_bytes_term(b'x', include_term, consume_term, false)?,
                b"fooo"
            );
            assert!(s.is_eof()?);

            let mut s = Stream::new(Cursor::new(&b"fooo"[..]));
            assert!(matches!(
                s.read_bytes_term(b'x', include_term, consume_term, true),
                Err(Error::EndOfStream { .. })
            ));
        }
    }
    Ok(())
}

#[test]
fn test_consecutive_strings() -> Result<()> {
    let mut r = SmallRng::seed_from_u64(0);
    let strings: Vec<Vec<u8>> = (0..300)
        .map(|_| {
            let len = r.random_range(0..600);
            (0..len).map(|_| r.random_range(1..=255u8)).collect()
        })
        .collect();

    let mut write = Stream::new(Cursor::new(Vec::new()));
    for s in &strings {
        write.write_bytes_term(s, &[0])?;
    }
    let mut read = Stream::new(Cursor::new(write.into_inner().into_inner()));
    for s in &strings {
        assert_eq!(&read.read_bytes_term(0, false, true, true)?, s);
    }
    assert!(read.is_eof()?);
    Ok(())
}

#[test]
fn test_utf16_strings() -> Result<()> {
    let text = "ab\u{100}";
    let mut data = Vec::new();
    for unit in text.encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }
    // U+0100 is stored as 00 01: a terminator straddling two units
    assert_eq!(data, [b'a', 0, b'b', 0, 0x00, 0x01]);
    data.extend_from_slice(&[0, 0]);
    data.extend_from_slice(b"z\0");

    let mut s = Stream::new(Cursor::new(data));
    let raw = s.read_bytes_term_multi(&[0, 0], false, true, true)?;
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
        .collect();
    assert_eq!(String::from_utf16(&units).unwrap(), text);
    assert_eq!(s.pos()?, 8);
    assert_eq!(s.read_bytes_term_multi(&[0, 0], true, true, false)?, b"z\0");
    assert!(s.is_eof()?);
    Ok(())
}

#[test]
fn test_pad_term_and_limit() -> Result<()> {
    let mut write = Stream::new(Cursor::new(Vec::new()));
    write.write_bytes_limit(b"abc", 8, 0, b' ')?;
    write.write_bytes_limit(b"abcdefgh", 8, 0, b' ')?;
    write.write_bytes_limit(b"", 2, b'|', b'.')?;
    assert!(matches!(
        write.write_bytes_limit(b"abcdefghi", 8, 0, b' '),
        Err(Error::SizeExceeded { size: 8, given: 9 })
    ));
    assert_eq!(write.pos()?, 18);

    let mut read = Stream::new(Cursor::new(write.into_inner().into_inner()));
    assert_eq!(read.read_bytes_pad_term(8, 0, b' ', false)?, b"abc");
    assert_eq!(read.read_bytes_pad_term(8, 0, b' ', true)?, b"abcdefgh");
    assert_eq!(read.read_bytes_pad_term(2, b'|', b'.', true)?, b"|");
    assert!(read.is_eof()?);
    Ok(())
}
