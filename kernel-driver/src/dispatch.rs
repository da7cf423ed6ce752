// src/dispatch.rs
//! Per-open entry points: open, read, write, close.
//!
//! A [`DeviceSession`] owns nothing. It exists so that read/write can only be
//! issued between `open` and `close`; any number of sessions may share one
//! device at the same time.

use crate::{
    device::CharDevice,
    drv_log,
    error::{TransferError, WriteError},
    semaphore::Signals,
    user::{UserSink, UserSource},
};
use log::Level;

/// An open handle on a [`CharDevice`].
#[derive(Debug)]
pub struct DeviceSession<'a> {
    device: &'a CharDevice,
    name: &'a str,
}

impl<'a> DeviceSession<'a> {
    /// Open: always succeeds, acquires nothing.
    pub fn open(device: &'a CharDevice, name: &'a str) -> Self {
        drv_log!(Level::Info, "open", "{}: opened device", name);
        Self { device, name }
    }

    /// Read `count` bytes (clamped to capacity) from offset 0 into `dst`.
    ///
    /// `Ok(0)` when everything was copied, otherwise the number of bytes
    /// that were not. Never blocks.
    pub fn read<D: UserSink + ?Sized>(&self, dst: &mut D, count: usize) -> Result<usize, TransferError> {
        drv_log!(Level::Info, "read", "{}: reading from device ({} bytes)", self.name, count);
        self.device.transfer_out(dst, count)
    }

    /// Write up to `count` bytes from `src` into the buffer under the
    /// writer lock.
    ///
    /// Blocks while another writer holds the lock; a signal raised on
    /// `signals` during that wait yields [`WriteError::Interrupted`] with
    /// the buffer untouched.
    pub fn write<S: UserSource + ?Sized>(&self, src: &S, count: usize, signals: &Signals) -> Result<(), WriteError> {
        drv_log!(Level::Info, "write", "{}: writing to device ({} bytes)", self.name, count);
        let guard = self.device.lock_for_write(signals).inspect_err(|_| {
            drv_log!(Level::Debug, "write", "{}: interrupted waiting for lock", self.name);
        })?;
        let res = guard.transfer_in(src, count);
        guard.release();
        res.map_err(|e| {
            drv_log!(Level::Warn, "write", "{}: {}", self.name, e);
            WriteError::Fault(e)
        })
    }

    pub fn device(&self) -> &'a CharDevice {
        self.device
    }

    /// Close: always succeeds, releases nothing.
    pub fn close(self) {
        drv_log!(Level::Info, "close", "{}: device close", self.name);
    }
}
