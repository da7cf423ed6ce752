// src/user.rs
//! Caller address space and the two copy primitives that cross it.
//!
//! The driver never dereferences caller memory directly. It goes through
//! [`UserSource`] / [`UserSink`], either of which may fault part-way, and the
//! copy functions report how many bytes they could *not* move.

use crate::buffer::SharedBuffer;

/// Caller memory the driver may read from (the `write` path).
pub trait UserSource {
    /// Byte at `offset`, or `None` if that address faults.
    fn fetch(&self, offset: usize) -> Option<u8>;
}

/// Caller memory the driver may write into (the `read` path).
pub trait UserSink {
    /// Store `byte` at `offset`; `false` if that address faults.
    fn put(&mut self, offset: usize, byte: u8) -> bool;
}

/// A caller buffer of which only the first `mapped` bytes are accessible.
///
/// Addresses at or past `mapped` fault, as do addresses past the end of the
/// allocation, the way an unmapped tail page would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBuffer {
    bytes: Vec<u8>,
    mapped: usize,
}

impl UserBuffer {
    /// Fully accessible, zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self { bytes: vec![0; len], mapped: len }
    }

    /// Fully accessible buffer holding `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let mapped = bytes.len();
        Self { bytes, mapped }
    }

    /// Restrict access to the first `mapped` bytes.
    pub fn with_mapped(mut self, mapped: usize) -> Self {
        self.mapped = mapped.min(self.bytes.len());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl UserSource for UserBuffer {
    fn fetch(&self, offset: usize) -> Option<u8> {
        if offset < self.mapped { self.bytes.get(offset).copied() } else { None }
    }
}

impl UserSink for UserBuffer {
    fn put(&mut self, offset: usize, byte: u8) -> bool {
        match self.bytes.get_mut(offset) {
            Some(slot) if offset < self.mapped => {
                *slot = byte;
                true
            }
            _ => false,
        }
    }
}

impl UserSource for [u8] {
    fn fetch(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }
}

impl UserSink for [u8] {
    fn put(&mut self, offset: usize, byte: u8) -> bool {
        match self.get_mut(offset) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }
}

/// Copy the first `n` bytes of `src` out to the caller.
///
/// Stops at the first faulting address. Returns the number of bytes that
/// could not be copied; 0 means all `n` made it.
pub fn copy_to_user<D: UserSink + ?Sized>(dst: &mut D, src: &SharedBuffer, n: usize) -> usize {
    for i in 0..n {
        let Some(byte) = src.load(i) else { return n - i };
        if !dst.put(i, byte) {
            return n - i;
        }
    }
    0
}

/// Copy `n` bytes from the caller into the start of `dst`.
///
/// Bytes before the first faulting address are already stored when this
/// returns. Returns the number of bytes that could not be copied.
pub fn copy_from_user<S: UserSource + ?Sized>(dst: &SharedBuffer, src: &S, n: usize) -> usize {
    if n > dst.capacity() {
        return n;
    }
    for i in 0..n {
        match src.fetch(i) {
            Some(byte) => dst.store(i, byte),
            None => return n - i,
        }
    }
    0
}
