/*
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::prelude::*;
use arbitrary::Arbitrary;
use std::io::Cursor;

#[derive(Arbitrary, Debug, Clone)]
pub struct FuzzCase {
    data: Vec<u8>,
    start: u16,
    term: Vec<u8>,
    include_term: bool,
    consume_term: bool,
    eos_error: bool,
}

/// Scans for single-byte and multi-byte terminators, checking result and
/// final position against the stateless helpers.
pub fn harness(case: FuzzCase) {
    let FuzzCase {
        data,
        start,
        term,
        include_term,
        consume_term,
        eos_error,
    } = case;
    let start = (start as usize).min(data.len());
    let rest = &data[start..];

    if let Some(&byte) = term.first() {
        let mut stream = Stream::new(Cursor::new(&data[..]));
        stream.seek(start as u64).unwrap();
        let res = stream.read_bytes_term(byte, include_term, consume_term, eos_error);
        match byte_array_index_of(rest, byte) {
            Some(i) => {
                assert_eq!(res.unwrap(), bytes_terminate(rest, byte, include_term));
                let end = start + i + consume_term as usize;
                assert_eq!(stream.pos().unwrap(), end as u64);
            }
            None if eos_error => assert!(matches!(res, Err(Error::EndOfStream { .. }))),
            None => {
                assert_eq!(res.unwrap(), rest);
                assert!(stream.is_eof().unwrap());
            }
        }
    }

    let mut stream = Stream::new(Cursor::new(&data[..]));
    stream.seek(start as u64).unwrap();
    let res = stream.read_bytes_term_multi(&term, include_term, consume_term, eos_error);
    if term.is_empty() {
        assert!(matches!(res, Err(Error::InvalidSize { .. })));
        return;
    }
    match rest.chunks_exact(term.len()).position(|unit| unit == term) {
        Some(i) => {
            assert_eq!(
                res.unwrap(),
                bytes_terminate_multi(rest, &term, include_term)
            );
            let end = start + (i + consume_term as usize) * term.len();
            assert_eq!(stream.pos().unwrap(), end as u64);
        }
        None if eos_error => assert!(matches!(res, Err(Error::EndOfStream { .. }))),
        None => {
            assert_eq!(res.unwrap(), rest);
            assert!(stream.is_eof().unwrap());
        }
    }
}
