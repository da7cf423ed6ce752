// src/buffer.rs
//! Fixed-capacity byte store behind the device.
//!
//! Cells are `AtomicU8` so that the unlocked read path can race the write
//! path without undefined behaviour. Only `Relaxed` ordering is used: a
//! reader may see any mix of old and new bytes while a write is in flight.

use crate::error::InitError;
use std::{
    fmt,
    sync::atomic::{AtomicU8, Ordering},
};

pub struct SharedBuffer {
    cells: Box<[AtomicU8]>,
}

impl SharedBuffer {
    /// Allocate `capacity` zeroed bytes, failing instead of aborting when
    /// the reservation cannot be satisfied.
    pub fn try_new(capacity: usize) -> Result<Self, InitError> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(capacity)
            .map_err(|_| InitError::Alloc { capacity })?;
        cells.resize_with(capacity, || AtomicU8::new(0));
        Ok(Self { cells: cells.into_boxed_slice() })
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Byte at `index`, or `None` past the end.
    pub fn load(&self, index: usize) -> Option<u8> {
        self.cells.get(index).map(|c| c.load(Ordering::Relaxed))
    }

    /// Store `byte` at `index`; out-of-range stores are ignored.
    pub fn store(&self, index: usize, byte: u8) {
        if let Some(cell) = self.cells.get(index) {
            cell.store(byte, Ordering::Relaxed);
        }
    }

    /// Copy of the whole buffer as it looks right now (not atomic as a whole).
    pub fn snapshot(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("capacity", &self.capacity())
            .finish()
    }
}
