/*
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::prelude::*;
use arbitrary::Arbitrary;
use std::io::Cursor;

const DEBUG: bool = false;

macro_rules! debugln {
    ($($arg:tt)*) => {
        if DEBUG {
            println!($($arg)*);
        }
    };
}

#[derive(Arbitrary, Debug, Clone)]
pub struct FuzzCase {
    commands: Vec<RandomCommand>,
}

#[derive(Arbitrary, Debug, Clone)]
enum RandomCommand {
    /// A bit field in the natural order of the stream.
    Bits(u64, u8),
    /// A bit field in the other order.
    OtherOrder(u64, u8),
    Byte(u8),
    Word(u32),
    Align,
}

#[inline(always)]
fn width(n: u8) -> u32 {
    n as u32 % 65
}

#[inline(always)]
fn masked(value: u64, n: u32) -> u64 {
    if n == 64 { value } else { value & ((1 << n) - 1) }
}

/// Writes the commands with big-endian and little-endian bit order, and
/// reads them back.
pub fn harness(data: FuzzCase) {
    debugln!("{:?}", data);
    let mut big = Stream::new(Cursor::new(Vec::new()));
    let mut little = Stream::new(Cursor::new(Vec::new()));
    let mut writes = vec![];

    for command in &data.commands {
        match *command {
            RandomCommand::Bits(value, n) => {
                let n = width(n);
                let value = masked(value, n);
                let big_success = big.write_bits_int_be(n, value).is_ok();
                let little_success = little.write_bits_int_le(n, value).is_ok();
                assert_eq!(big_success, little_success);
                writes.push(big_success);
            }
            RandomCommand::OtherOrder(value, n) => {
                let n = width(n);
                let value = masked(value, n);
                let big_success = big.write_bits_int_le(n, value).is_ok();
                let little_success = little.write_bits_int_be(n, value).is_ok();
                assert_eq!(big_success, little_success);
                writes.push(big_success);
            }
            RandomCommand::Byte(value) => {
                big.write_u1(value).unwrap();
                little.write_u1(value).unwrap();
                writes.push(true);
            }
            RandomCommand::Word(value) => {
                big.write_u4be(value).unwrap();
                little.write_u4le(value).unwrap();
                writes.push(true);
            }
            RandomCommand::Align => {
                big.write_align_to_byte().unwrap();
                little.write_align_to_byte().unwrap();
                writes.push(true);
            }
        }
        assert_eq!(big.bits_left(), little.bits_left());
    }
    big.write_align_to_byte().unwrap();
    little.write_align_to_byte().unwrap();

    let mut big = Stream::new(Cursor::new(big.into_inner().into_inner()));
    let mut little = Stream::new(Cursor::new(little.into_inner().into_inner()));
    assert_eq!(big.size().unwrap(), little.size().unwrap());

    for (succ, command) in writes.iter().zip(data.commands.iter()) {
        match *command {
            RandomCommand::Bits(value, n) => {
                let n = width(n);
                let b = big.read_bits_int_be(n);
                let l = little.read_bits_int_le(n);
                if *succ {
                    let value = masked(value, n);
                    assert_eq!(b.unwrap(), value);
                    assert_eq!(l.unwrap(), value);
                } else {
                    assert!(matches!(b, Err(Error::BitModeSwitch { .. })));
                    assert!(matches!(l, Err(Error::BitModeSwitch { .. })));
                }
            }
            RandomCommand::OtherOrder(value, n) => {
                let n = width(n);
                let b = big.read_bits_int_le(n);
                let l = little.read_bits_int_be(n);
                if *succ {
                    let value = masked(value, n);
                    assert_eq!(b.unwrap(), value);
                    assert_eq!(l.unwrap(), value);
                } else {
                    assert!(matches!(b, Err(Error::BitModeSwitch { .. })));
                    assert!(matches!(l, Err(Error::BitModeSwitch { .. })));
                }
            }
            RandomCommand::Byte(value) => {
                assert_eq!(big.read_u1().unwrap(), value);
                assert_eq!(little.read_u1().unwrap(), value);
            }
            RandomCommand::Word(value) => {
                assert_eq!(big.read_u4be().unwrap(), value);
                assert_eq!(little.read_u4le().unwrap(), value);
            }
            RandomCommand::Align => {
                big.align_to_byte();
                little.align_to_byte();
            }
        }
    }
    big.align_to_byte();
    little.align_to_byte();
    assert!(big.is_eof().unwrap());
    assert!(little.is_eof().unwrap());
}
