/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Deferred write-back of child streams.

Some fields can be serialized only after the data they describe: a length
prefix, a checksum, or the content of a substream living in its own buffer.
The parent stream reserves room for such fields, and then registers, with
[`Stream::add_child`], the child stream that will know the final values,
together with a [`WriteBackHandler`] bound to the reserved offset.

Once the whole tree of streams has been serialized, a single call to
[`Stream::write_back_children`] on the root walks the tree in post-order: the
children of a child are written back into it before the child itself is
written back into its parent.

Children are owned by their parent, so the tree cannot contain cycles; a
child that must write to the same medium as its parent can be built on a
[`SharedMedium`](crate::impls::SharedMedium).

*/

use core::any::Any;
use core::marker::PhantomData;
use std::io::{Read, Seek, Write};

use tracing::debug;

use crate::error::Result;
use crate::impls::Stream;

type Callback<C, P> = Box<dyn FnOnce(&mut Stream<C>, &mut Stream<P>) -> Result<()>>;

/// A deferred write into a parent stream.
///
/// A handler pairs the byte offset reserved in the parent with a callback
/// that receives the child stream and the parent stream, the latter already
/// positioned at the offset. The callback runs exactly once.
pub struct WriteBackHandler<C, P> {
    pos: u64,
    callback: Callback<C, P>,
}

impl<C, P> WriteBackHandler<C, P> {
    /// Creates a new handler writing at byte offset `pos` of the parent.
    pub fn new<F>(pos: u64, callback: F) -> Self
    where
        F: FnOnce(&mut Stream<C>, &mut Stream<P>) -> Result<()> + 'static,
    {
        Self {
            pos,
            callback: Box::new(callback),
        }
    }

    /// Returns the offset in the parent at which the callback writes.
    pub fn pos(&self) -> u64 {
        self.pos
    }
}

impl<C: Read + Seek, P: Write> WriteBackHandler<C, P> {
    /// Creates a handler that copies the whole content of the child into
    /// the parent at byte offset `pos`.
    pub fn copy_contents(pos: u64) -> Self {
        Self::new(pos, |child: &mut Stream<C>, parent: &mut Stream<P>| {
            let bytes = child.to_byte_array()?;
            parent.write_bytes(&bytes)
        })
    }
}

impl<C, P> core::fmt::Debug for WriteBackHandler<C, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WriteBackHandler")
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

/// A typed handle to a child registered with [`Stream::add_child`].
///
/// A handle is meaningful only for the stream that returned it.
pub struct ChildId<C> {
    index: usize,
    _marker: PhantomData<fn() -> C>,
}

impl<C> Clone for ChildId<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ChildId<C> {}

impl<C> core::fmt::Debug for ChildId<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ChildId").field(&self.index).finish()
    }
}

/// A registered child, with its medium type erased.
pub(crate) trait WriteBackNode<P> {
    /// Writes back the children of this node, and then this node into
    /// `parent`.
    fn write_back(self: Box<Self>, parent: &mut Stream<P>) -> Result<()>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct ChildStream<C, P> {
    stream: Stream<C>,
    handler: WriteBackHandler<C, P>,
}

impl<C, P> WriteBackNode<P> for ChildStream<C, P>
where
    C: Write + Seek + 'static,
    P: Write + Seek + 'static,
{
    fn write_back(self: Box<Self>, parent: &mut Stream<P>) -> Result<()> {
        let ChildStream {
            mut stream,
            handler,
        } = *self;
        stream.write_back_children()?;
        stream.write_align_to_byte()?;
        parent.write_align_to_byte()?;
        parent.seek(handler.pos)?;
        debug!(pos = handler.pos, "writing back child stream");
        (handler.callback)(&mut stream, parent)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<M: Write + Seek + 'static> Stream<M> {
    /// Registers `child` for write-back into this stream through `handler`,
    /// and returns a handle to access it until it is written back.
    pub fn add_child<C: Write + Seek + 'static>(
        &mut self,
        child: Stream<C>,
        handler: WriteBackHandler<C, M>,
    ) -> ChildId<C> {
        let index = self.children.len();
        self.children.push(Some(Box::new(ChildStream {
            stream: child,
            handler,
        })));
        ChildId {
            index,
            _marker: PhantomData,
        }
    }

    /// Returns the child identified by `id`, or `None` if it has already
    /// been written back.
    pub fn child_mut<C: 'static>(&mut self, id: ChildId<C>) -> Option<&mut Stream<C>> {
        self.children
            .get_mut(id.index)?
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<ChildStream<C, M>>()
            .map(|child| &mut child.stream)
    }

    /// Returns the number of children waiting to be written back.
    pub fn pending_children(&self) -> usize {
        self.children.iter().flatten().count()
    }

    /// Writes back all registered children, in registration order, each
    /// after its own children, and then unregisters them.
    ///
    /// Pending written bits are flushed first and after the last handler,
    /// and the position of this stream is restored at the end. A failure
    /// stops the walk: the failing child is dropped, the children that were
    /// not reached are still registered, and the output written so far is
    /// not rolled back.
    pub fn write_back_children(&mut self) -> Result<()> {
        if self.children.is_empty() {
            return Ok(());
        }
        self.write_align_to_byte()?;
        let pos = self.pos()?;
        // callbacks may register further children
        let mut i = 0;
        while i < self.children.len() {
            if let Some(child) = self.children[i].take() {
                child.write_back(self)?;
            }
            i += 1;
        }
        self.children.clear();
        self.write_align_to_byte()?;
        self.seek(pos)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    type Buf = Cursor<Vec<u8>>;
    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(log: &Log, name: &'static str) -> WriteBackHandler<Buf, Buf> {
        let log = log.clone();
        WriteBackHandler::new(0, move |_: &mut Stream<Buf>, _: &mut Stream<Buf>| {
            log.borrow_mut().push(name);
            Ok(())
        })
    }

    fn buf() -> Stream<Buf> {
        Stream::new(Cursor::new(Vec::new()))
    }

    #[test]
    fn test_post_order() -> Result<()> {
        let log = Log::default();
        let mut root = buf();
        for (child, grandchild) in [("child-a", "grandchild-a"), ("child-b", "grandchild-b")] {
            let mut c = buf();
            c.add_child(buf(), recorder(&log, grandchild));
            root.add_child(c, recorder(&log, child));
        }
        assert_eq!(root.pending_children(), 2);
        root.write_back_children()?;
        assert_eq!(
            *log.borrow(),
            ["grandchild-a", "child-a", "grandchild-b", "child-b"]
        );
        assert_eq!(root.pending_children(), 0);
        root.write_back_children()?;
        assert_eq!(log.borrow().len(), 4);
        Ok(())
    }

    #[test]
    fn test_length_prefix() -> Result<()> {
        let mut root = buf();
        root.write_u2be(0)?;
        root.write_bytes(&[0; 4])?;
        root.write_u1(0xFF)?;
        let id = root.add_child(
            Stream::new(Cursor::new(vec![0; 4])),
            WriteBackHandler::new(0, |body: &mut Stream<Buf>, parent: &mut Stream<Buf>| {
                let len = body.pos()?;
                parent.write_u2be(len as u16)?;
                parent.write_bytes(&body.to_byte_array()?[..len as usize])
            }),
        );
        let body = root.child_mut(id).unwrap();
        body.write_bytes(b"ab")?;
        body.write_bits_int_be(4, 0xF)?;
        root.write_back_children()?;
        assert!(root.child_mut(id).is_none());
        assert_eq!(root.pos()?, 7);
        assert_eq!(
            root.into_inner().into_inner(),
            [0x00, 0x03, b'a', b'b', 0xF0, 0x00, 0xFF]
        );
        Ok(())
    }

    #[test]
    fn test_copy_contents() -> Result<()> {
        let mut root = buf();
        root.write_bytes(b"<...>")?;
        let id = root.add_child(
            Stream::new(Cursor::new(vec![0; 3])),
            WriteBackHandler::copy_contents(1),
        );
        root.child_mut(id).unwrap().write_bytes(b"xyz")?;
        root.write_back_children()?;
        assert_eq!(root.into_inner().into_inner(), b"<xyz>");
        Ok(())
    }

    #[test]
    fn test_handler_leaves_bits() -> Result<()> {
        let mut root = Stream::new(Cursor::new(vec![0u8; 3]));
        root.seek(2)?;
        root.add_child(
            buf(),
            WriteBackHandler::new(0, |_: &mut Stream<Buf>, parent: &mut Stream<Buf>| {
                parent.write_bits_int_be(4, 0xF)
            }),
        );
        root.write_back_children()?;
        assert_eq!(root.bits_left(), 0);
        assert_eq!(root.pos()?, 2);
        assert_eq!(root.into_inner().into_inner(), [0xF0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_failure_keeps_pending_children() {
        let log = Log::default();
        let mut root = buf();
        root.add_child(
            buf(),
            WriteBackHandler::new(0, |_: &mut Stream<Buf>, _: &mut Stream<Buf>| {
                Err(crate::error::Error::SizeExceeded { size: 1, given: 2 })
            }),
        );
        root.add_child(buf(), recorder(&log, "late"));
        assert!(root.write_back_children().is_err());
        assert!(log.borrow().is_empty());
        assert_eq!(root.pending_children(), 1);
        assert!(root.write_back_children().is_ok());
        assert_eq!(*log.borrow(), ["late"]);
    }
}
