// src/device.rs
//! The device proper: one buffer, one writer lock, and the transfers
//! between them and a caller.
//!
//!  * Reads take no lock and may run alongside a write.
//!  * Writes must hold the lock; [`WriteGuard`] is the only way to reach
//!    [`WriteGuard::transfer_in`].

use crate::{
    buffer::SharedBuffer,
    error::{InitError, Interrupted, TransferError},
    semaphore::{Semaphore, SemaphoreGuard, Signals},
    user::{UserSink, UserSource, copy_from_user, copy_to_user},
};

#[derive(Debug)]
pub struct CharDevice {
    buffer: SharedBuffer,
    lock: Semaphore,
}

impl CharDevice {
    /// Allocate a zeroed buffer of `capacity` bytes and a free lock.
    pub fn new(capacity: usize) -> Result<Self, InitError> {
        Ok(Self {
            buffer: SharedBuffer::try_new(capacity)?,
            lock: Semaphore::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    pub fn lock(&self) -> &Semaphore {
        &self.lock
    }

    /// Copy `min(count, capacity)` bytes from offset 0 to `dst`.
    ///
    /// Returns how many of those bytes could not be copied (0 on success).
    /// A destination that rejects every byte is reported as a fault.
    pub fn transfer_out<D: UserSink + ?Sized>(&self, dst: &mut D, count: usize) -> Result<usize, TransferError> {
        let n = count.min(self.capacity());
        let not_copied = copy_to_user(dst, &self.buffer, n);
        if n > 0 && not_copied == n {
            return Err(TransferError { requested: n, not_copied });
        }
        Ok(not_copied)
    }

    /// Wait for the writer lock.
    pub fn lock_for_write(&self, signals: &Signals) -> Result<WriteGuard<'_>, Interrupted> {
        let guard = self.lock.down_interruptible(signals)?;
        Ok(WriteGuard { device: self, guard })
    }

    /// Take the writer lock only if nobody holds it.
    pub fn try_lock_for_write(&self) -> Option<WriteGuard<'_>> {
        self.lock.try_down().map(|guard| WriteGuard { device: self, guard })
    }
}

/// Exclusive write access to one [`CharDevice`].
#[must_use = "dropping the guard releases the writer lock immediately"]
pub struct WriteGuard<'a> {
    device: &'a CharDevice,
    guard: SemaphoreGuard<'a>,
}

impl WriteGuard<'_> {
    /// Copy up to `min(count, capacity)` bytes from `src` into the buffer.
    ///
    /// On a fault the bytes before the faulting address are already in the
    /// buffer; nothing is rolled back.
    pub fn transfer_in<S: UserSource + ?Sized>(&self, src: &S, count: usize) -> Result<(), TransferError> {
        debug_assert!(self.guard.belongs_to(&self.device.lock));
        let n = count.min(self.device.capacity());
        match copy_from_user(&self.device.buffer, src, n) {
            0 => Ok(()),
            not_copied => Err(TransferError { requested: n, not_copied }),
        }
    }

    /// Release the writer lock.
    pub fn release(self) {
        self.guard.release();
    }
}
