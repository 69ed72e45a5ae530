/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::cell::RefCell;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

use crate::impls::Stream;

/// A reference-counted handle to a medium, so that several streams (for
/// example, a parent and the children it writes back) can operate on the
/// same underlying data.
///
/// Every handle shares the position of the medium. The handle is not
/// thread-safe; an access while another handle is borrowing the medium
/// fails with an I/O error of kind [`io::ErrorKind::Other`].
#[derive(Debug, Default)]
pub struct SharedMedium<M>(Rc<RefCell<M>>);

impl<M> Clone for SharedMedium<M> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<M> SharedMedium<M> {
    pub fn new(medium: M) -> Self {
        Self(Rc::new(RefCell::new(medium)))
    }

    /// Returns the medium if this is the last handle, and the handle itself
    /// otherwise.
    pub fn into_inner(self) -> Result<M, Self> {
        Rc::try_unwrap(self.0)
            .map(RefCell::into_inner)
            .map_err(Self)
    }

    /// Returns the number of live handles to the medium.
    pub fn handles(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    #[inline]
    fn with<T>(&self, f: impl FnOnce(&mut M) -> io::Result<T>) -> io::Result<T> {
        let mut medium = self.0.try_borrow_mut().map_err(io::Error::other)?;
        f(&mut medium)
    }
}

impl<M: Read> Read for SharedMedium<M> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.with(|m| m.read(buf))
    }
}

impl<M: Write> Write for SharedMedium<M> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with(|m| m.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|m| m.flush())
    }
}

impl<M: Seek> Seek for SharedMedium<M> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.with(|m| m.seek(pos))
    }
}

impl<M> Stream<SharedMedium<M>> {
    /// Returns a new stream on the same medium, with an empty bit buffer
    /// and no children.
    pub fn share(&self) -> Self {
        Stream::new(self.medium.clone())
    }
}
