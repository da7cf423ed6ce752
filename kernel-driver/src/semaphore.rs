// src/semaphore.rs
//! Binary semaphore with an interruptible `down`.
//!
//! The single permit travels through a one-slot crossbeam channel: taking it
//! out means "held", putting it back means "free". Each calling context owns
//! a [`Signals`] mailbox; a raised signal wakes a blocked `down` which then
//! gives up without touching the permit.

use crate::error::Interrupted;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::fmt;

/*──────────────────────────────── signals ───────────────────────────────*/

/// Pending-signal mailbox of one calling context.
pub struct Signals {
    rx: Receiver<()>,
}

/// Raises signals on the matching [`Signals`].
#[derive(Clone)]
pub struct SignalHandle {
    tx: Sender<()>,
}

impl Signals {
    /// New mailbox plus the handle used to interrupt it.
    pub fn new() -> (SignalHandle, Signals) {
        let (tx, rx) = channel::bounded(1);
        (SignalHandle { tx }, Signals { rx })
    }

    /// A context nobody can interrupt.
    pub fn none() -> Signals {
        Signals { rx: channel::never() }
    }

    /// Whether a signal is waiting to be delivered.
    pub fn is_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}

impl SignalHandle {
    /// Mark a signal pending. Raising twice before delivery coalesces.
    pub fn raise(&self) {
        let _ = self.tx.try_send(());
    }
}

/*──────────────────────────────── semaphore ─────────────────────────────*/

pub struct Semaphore {
    permit_tx: Sender<()>,
    permit_rx: Receiver<()>,
}

impl Semaphore {
    /// A free semaphore.
    pub fn new() -> Self {
        let (permit_tx, permit_rx) = channel::bounded(1);
        let _ = permit_tx.try_send(());
        Self { permit_tx, permit_rx }
    }

    /// Block until the permit is free or a signal arrives.
    ///
    /// A free permit is taken even when a signal is already pending; the
    /// signal only matters once the caller actually has to sleep. On
    /// `Err(Interrupted)` the signal is consumed and the permit is untouched.
    pub fn down_interruptible(&self, signals: &Signals) -> Result<SemaphoreGuard<'_>, Interrupted> {
        if self.permit_rx.try_recv().is_ok() {
            return Ok(SemaphoreGuard { sem: self });
        }

        crossbeam::select! {
            recv(self.permit_rx) -> _ => Ok(SemaphoreGuard { sem: self }),
            recv(signals.rx) -> sig => match sig {
                Ok(()) => Err(Interrupted),
                // Every `SignalHandle` is gone: nobody can interrupt us anymore.
                Err(_) => {
                    let _ = self.permit_rx.recv();
                    Ok(SemaphoreGuard { sem: self })
                }
            },
        }
    }

    /// Take the permit only if it is free right now.
    pub fn try_down(&self) -> Option<SemaphoreGuard<'_>> {
        match self.permit_rx.try_recv() {
            Ok(()) => Some(SemaphoreGuard { sem: self }),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.permit_rx.is_empty()
    }

    fn up(&self) {
        let _ = self.permit_tx.try_send(());
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore").field("held", &self.is_held()).finish()
    }
}

/// Proof of holding the permit. Dropping it releases.
#[must_use = "dropping the guard releases the semaphore immediately"]
pub struct SemaphoreGuard<'a> {
    sem: &'a Semaphore,
}

impl SemaphoreGuard<'_> {
    /// Give the permit back.
    pub fn release(self) {}

    pub(crate) fn belongs_to(&self, sem: &Semaphore) -> bool {
        std::ptr::eq(self.sem, sem)
    }
}

impl Drop for SemaphoreGuard<'_> {
    fn drop(&mut self) {
        self.sem.up();
    }
}
