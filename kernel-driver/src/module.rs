// src/module.rs
//! Load / unload of the driver against a [`HostOs`].
//!
//! Bring-up order is fixed:
//!   1. register a device number
//!   2. create the class
//!   3. create the node (`/dev/<name>`)
//!   4. allocate the buffer
//!   5. publish the device
//!
//! Every handle lives in an `Option` that is only filled once its step
//! succeeds. Teardown takes each one out before releasing it, so it can run
//! after any prefix of the steps and any number of times.

use crate::{
    device::CharDevice,
    dispatch::DeviceSession,
    drv_log,
    error::{InitError, InitStep, OpenError},
    host::{ClassId, DevNum, HostOs},
};
use log::Level;
use shared::constants::{BUF_LENGTH, DEVICE_NAME};
use std::path::{Path, PathBuf};

/// What to register and how large a buffer to allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub name: String,
    pub capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { name: DEVICE_NAME.into(), capacity: BUF_LENGTH }
    }
}

/// A loaded driver: host registrations plus the device they expose.
pub struct Module<H: HostOs> {
    host: H,
    name: String,
    num: Option<DevNum>,
    class: Option<ClassId>,
    node: Option<PathBuf>,
    device: Option<CharDevice>,
    published: bool,
    loaded: bool,
}

impl<H: HostOs> Module<H> {
    /// Bring the driver up. On failure everything acquired so far is
    /// released before the error is returned.
    pub fn load(host: H, cfg: &DriverConfig) -> Result<Self, InitError> {
        let mut module = Self {
            host,
            name: cfg.name.clone(),
            num: None,
            class: None,
            node: None,
            device: None,
            published: false,
            loaded: false,
        };

        if let Err(e) = module.bring_up(cfg.capacity) {
            drv_log!(Level::Error, "init", "{}: {}", module.name, e);
            module.teardown();
            return Err(e);
        }

        module.loaded = true;
        drv_log!(Level::Info, "init", "{}: loaded module", module.name);
        Ok(module)
    }

    fn bring_up(&mut self, capacity: usize) -> Result<(), InitError> {
        let num = self
            .host
            .alloc_region(&self.name)
            .map_err(|source| InitError::Host { step: InitStep::RegisterRegion, source })?;
        self.num = Some(num);

        let class = self
            .host
            .create_class(&self.name)
            .map_err(|source| InitError::Host { step: InitStep::CreateClass, source })?;
        self.class = Some(class);

        let node = self
            .host
            .create_node(class, num, &self.name)
            .map_err(|source| InitError::Host { step: InitStep::CreateNode, source })?;
        self.node = Some(node);

        self.device = Some(CharDevice::new(capacity)?);

        self.host
            .add_device(num)
            .map_err(|source| InitError::Host { step: InitStep::PublishDevice, source })?;
        self.published = true;

        Ok(())
    }

    /// Release whatever is registered, newest first. Safe to call at any
    /// point and any number of times.
    pub fn teardown(&mut self) {
        // Set only by a load that ran to completion.
        let was_loaded = std::mem::take(&mut self.loaded);

        if std::mem::take(&mut self.published) {
            if let Some(num) = self.num {
                self.host.remove_device(num);
            }
        }
        self.device = None;
        if let Some(node) = self.node.take() {
            // The node was created under both handles; both are still held here.
            if let (Some(class), Some(num)) = (self.class, self.num) {
                self.host.destroy_node(class, num);
            }
            drv_log!(Level::Debug, "exit", "{}: released node {}", self.name, node.display());
        }
        if let Some(class) = self.class.take() {
            self.host.destroy_class(class);
        }
        if let Some(num) = self.num.take() {
            self.host.release_region(num);
        }

        if was_loaded {
            drv_log!(Level::Info, "exit", "{}: unloaded module", self.name);
        }
    }

    /// Open the device through its node.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<DeviceSession<'_>, OpenError> {
        let path = path.as_ref();
        match (self.device.as_ref(), self.host.lookup(path)) {
            (Some(device), Some(num)) if self.published && Some(num) == self.num => {
                Ok(DeviceSession::open(device, &self.name))
            }
            _ => Err(OpenError::NoDevice(path.to_path_buf())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node published for this module, while loaded.
    pub fn node(&self) -> Option<&Path> {
        self.node.as_deref()
    }

    pub fn dev_num(&self) -> Option<DevNum> {
        self.num
    }

    /// The device, while loaded.
    pub fn device(&self) -> Option<&CharDevice> {
        self.device.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_loaded(&self) -> bool {
        self.published
    }
}

impl<H: HostOs> Drop for Module<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
