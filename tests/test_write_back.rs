/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use kaitai_stream::prelude::*;
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

type Buf = Cursor<Vec<u8>>;
type Log = Rc<RefCell<Vec<&'static str>>>;

fn buf(len: usize) -> Stream<Buf> {
    Stream::new(Cursor::new(vec![0; len]))
}

fn recorder(log: &Log, name: &'static str) -> WriteBackHandler<Buf, Buf> {
    let log = log.clone();
    WriteBackHandler::new(0, move |_: &mut Stream<Buf>, _: &mut Stream<Buf>| {
        log.borrow_mut().push(name);
        Ok(())
    })
}

#[test]
fn test_post_order() -> Result<()> {
    let log = Log::default();

    let mut a1 = buf(0);
    a1.add_child(buf(0), recorder(&log, "a1x"));
    let mut a = buf(0);
    a.add_child(a1, recorder(&log, "a1"));
    a.add_child(buf(0), recorder(&log, "a2"));
    let mut b = buf(0);
    b.add_child(buf(0), recorder(&log, "b1"));

    let mut root = buf(0);
    root.add_child(a, recorder(&log, "a"));
    root.add_child(b, recorder(&log, "b"));
    root.add_child(buf(0), recorder(&log, "c"));
    root.write_bytes(b"root")?;

    root.write_back_children()?;
    assert_eq!(*log.borrow(), ["a1x", "a1", "a2", "a", "b1", "b", "c"]);
    assert_eq!(root.pos()?, 4);
    assert_eq!(root.pending_children(), 0);

    root.write_back_children()?;
    assert_eq!(log.borrow().len(), 7);
    Ok(())
}

#[test]
fn test_nested_length_prefixes() -> Result<()> {
    // root: u2be length, 4-byte record, trailer
    let mut root = buf(0);
    root.write_u2be(0)?;
    root.write_bytes(&[0; 4])?;
    root.write_u1(0xEE)?;

    // record: u1 length, 3-byte payload
    let mut record = buf(4);
    record.write_u1(0)?;
    record.write_bytes(&[0; 3])?;

    let mut payload = buf(3);
    payload.write_bytes(b"hi")?;

    record.add_child(
        payload,
        WriteBackHandler::new(0, |payload: &mut Stream<Buf>, record: &mut Stream<Buf>| {
            let len = payload.pos()?;
            record.write_u1(len as u8)?;
            record.write_bytes(&payload.to_byte_array()?)
        }),
    );
    root.add_child(
        record,
        WriteBackHandler::new(0, |record: &mut Stream<Buf>, root: &mut Stream<Buf>| {
            root.write_u2be(record.size()? as u16)?;
            root.write_bytes(&record.to_byte_array()?)
        }),
    );

    root.write_back_children()?;
    assert_eq!(root.pos()?, 7);
    assert_eq!(
        root.into_inner().into_inner(),
        [0x00, 0x04, 0x02, b'h', b'i', 0x00, 0xEE]
    );
    Ok(())
}

#[test]
fn test_handler_sees_reserved_offset() -> Result<()> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut root = buf(16);
    root.seek(9)?;
    for pos in [3, 0, 12] {
        let seen = seen.clone();
        root.add_child(
            buf(0),
            WriteBackHandler::new(pos, move |_: &mut Stream<Buf>, parent: &mut Stream<Buf>| {
                seen.borrow_mut().push(parent.pos()?);
                parent.write_u4be(0xFFFF_FFFF)
            }),
        );
    }
    root.write_back_children()?;
    assert_eq!(*seen.borrow(), [3, 0, 12]);
    assert_eq!(root.pos()?, 9);
    Ok(())
}

#[test]
fn test_copy_into_shared_medium() -> Result<()> {
    type Shared = SharedMedium<Buf>;
    let mut root = Stream::new(SharedMedium::new(Cursor::new(vec![0u8; 6])));
    let mut header = root.share();
    header.seek(4)?;
    header.write_u2le(0x1234)?;
    let mut checksum = Stream::new(Cursor::new(vec![0u8; 1]));
    checksum.write_u1(0x42)?;
    root.add_child(
        checksum,
        WriteBackHandler::<Buf, Shared>::copy_contents(0),
    );
    root.seek(2)?;
    root.write_back_children()?;
    assert_eq!(root.pos()?, 2);
    drop(header);
    let medium = root.into_inner().into_inner().unwrap();
    assert_eq!(medium.into_inner(), [0x42, 0, 0, 0, 0x34, 0x12]);
    Ok(())
}
