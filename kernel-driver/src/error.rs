// src/error.rs
//! Every way a driver entry point can fail.
//!
//! Nothing here is fatal: each error is handed back to the caller of the
//! entry point that produced it, and retrying is the caller's business.

use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Bring-up steps, in the order `Module::load` performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitStep {
    RegisterRegion,
    CreateClass,
    CreateNode,
    AllocateBuffer,
    PublishDevice,
}

impl InitStep {
    pub const ALL: [InitStep; 5] = [
        InitStep::RegisterRegion,
        InitStep::CreateClass,
        InitStep::CreateNode,
        InitStep::AllocateBuffer,
        InitStep::PublishDevice,
    ];
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InitStep::RegisterRegion => "failed to allocate a major number",
            InitStep::CreateClass    => "failed to allocate class",
            InitStep::CreateNode     => "failed to allocate device file",
            InitStep::AllocateBuffer => "failed to allocate buffer",
            InitStep::PublishDevice  => "unable to add char device",
        })
    }
}

/// Refusals reported by the host registration layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("name '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("no free device numbers")]
    Exhausted,

    #[error("host refused the request")]
    Refused,
}

/// Bring-up failed; everything acquired before `step` has been released.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("{step}: {source}")]
    Host {
        step: InitStep,
        #[source]
        source: HostError,
    },

    #[error("{}: cannot reserve {capacity} bytes", InitStep::AllocateBuffer)]
    Alloc { capacity: usize },
}

impl InitError {
    /// The step that failed.
    pub fn step(&self) -> InitStep {
        match self {
            InitError::Host { step, .. } => *step,
            InitError::Alloc { .. } => InitStep::AllocateBuffer,
        }
    }
}

/// The lock wait was cut short by a signal; nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted while waiting for the device lock")]
pub struct Interrupted;

/// The caller's memory could not be read or written in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bad address: {not_copied} of {requested} bytes could not be copied")]
pub struct TransferError {
    pub requested: usize,
    pub not_copied: usize,
}

/// Outcome of a failed `write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error(transparent)]
    Fault(#[from] TransferError),
}

/// The node does not resolve to a live device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenError {
    #[error("no such device: {}", .0.display())]
    NoDevice(PathBuf),
}
