//! s33drax: a single-instance character device.
//!
//! One fixed-size buffer, shared by every open session, with a binary
//! semaphore serializing writers. Readers never take the lock, so a read
//! racing a write may see a mix of old and new bytes.
//!
//! ```text
//!   Module::load ─▶ HostOs (region, class, node, publish)
//!        │
//!        └─▶ CharDevice { SharedBuffer, Semaphore }
//!                 ▲
//!   Module::open ─┴─ DeviceSession ── read  ─▶ copy_to_user
//!                                  └─ write ─▶ lock ─▶ copy_from_user ─▶ unlock
//! ```

mod macros;

pub mod buffer;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod module;
pub mod semaphore;
pub mod user;

#[doc(hidden)]
pub use log;

pub use buffer::SharedBuffer;
pub use device::{CharDevice, WriteGuard};
pub use dispatch::DeviceSession;
pub use error::{HostError, InitError, InitStep, Interrupted, OpenError, TransferError, WriteError};
pub use host::{ClassId, DevNum, HostOs, InMemoryHost};
pub use module::{DriverConfig, Module};
pub use semaphore::{Semaphore, SemaphoreGuard, SignalHandle, Signals};
pub use user::{UserBuffer, UserSink, UserSource, copy_from_user, copy_to_user};
