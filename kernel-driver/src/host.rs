// src/host.rs
//! Boundary to the host OS registration layer.
//!
//! The driver only needs to register a device number, a class and a node,
//! publish the device, and undo each of those. [`HostOs`] is that contract;
//! [`InMemoryHost`] implements it in-process for the tester and the tests.

use crate::{
    drv_log,
    error::{HostError, InitStep},
};
use log::Level;
use shared::constants::DEV_DIR;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

/*──────────────────────────────── handles ───────────────────────────────*/

/// Major/minor pair handed out by `alloc_region`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DevNum {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Opaque id of a registered device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/*──────────────────────────────── contract ──────────────────────────────*/

/// Registration services the driver consumes.
///
/// The `destroy_*` / `release_*` / `remove_*` calls are only made for
/// handles the matching create call returned.
pub trait HostOs {
    fn alloc_region(&self, name: &str) -> Result<DevNum, HostError>;
    fn create_class(&self, name: &str) -> Result<ClassId, HostError>;
    fn create_node(&self, class: ClassId, num: DevNum, name: &str) -> Result<PathBuf, HostError>;
    fn add_device(&self, num: DevNum) -> Result<(), HostError>;

    fn remove_device(&self, num: DevNum);
    fn destroy_node(&self, class: ClassId, num: DevNum);
    fn destroy_class(&self, class: ClassId);
    fn release_region(&self, num: DevNum);

    /// Device number behind a published node, if any.
    fn lookup(&self, path: &Path) -> Option<DevNum>;
}

/*──────────────────────────────── in-memory host ────────────────────────*/

const FIRST_DYNAMIC_MAJOR: u32 = 240;
const LAST_DYNAMIC_MAJOR: u32 = 254;

#[derive(Debug, Default)]
struct HostState {
    regions: BTreeMap<DevNum, String>,
    classes: BTreeMap<ClassId, String>,
    nodes: BTreeMap<PathBuf, (ClassId, DevNum)>,
    live: BTreeSet<DevNum>,
    next_class: u32,
    fail_at: BTreeSet<InitStep>,
    faults: usize,
}

impl HostState {
    fn check(&self, step: InitStep) -> Result<(), HostError> {
        if self.fail_at.contains(&step) { Err(HostError::Refused) } else { Ok(()) }
    }

    fn fault(&mut self, what: fmt::Arguments<'_>) {
        self.faults += 1;
        drv_log!(Level::Error, "host", "in-memory host: release of unknown {}", what);
    }
}

/// Shared, cloneable in-process registry.
///
/// Clones see the same state, so a test can keep one clone to inspect the
/// host while a module owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future attempt at `step` fail with `HostError::Refused`.
    ///
    /// `InitStep::AllocateBuffer` is not a host call and is unaffected.
    pub fn fail_at(&self, step: InitStep) {
        self.lock().fail_at.insert(step);
    }

    /// Stop failing `step`.
    pub fn clear_failure(&self, step: InitStep) {
        self.lock().fail_at.remove(&step);
    }

    /// Releases of handles the host never handed out (or already took back).
    pub fn faults(&self) -> usize {
        self.lock().faults
    }

    /// No region, class, node or published device is left registered.
    pub fn is_clean(&self) -> bool {
        let st = self.lock();
        st.regions.is_empty() && st.classes.is_empty() && st.nodes.is_empty() && st.live.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        // A panic while holding the lock cannot leave the maps half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HostOs for InMemoryHost {
    fn alloc_region(&self, name: &str) -> Result<DevNum, HostError> {
        let mut st = self.lock();
        st.check(InitStep::RegisterRegion)?;
        if st.regions.values().any(|n| n == name) {
            return Err(HostError::AlreadyRegistered(name.into()));
        }
        let num = (FIRST_DYNAMIC_MAJOR..=LAST_DYNAMIC_MAJOR)
            .map(|major| DevNum { major, minor: 0 })
            .find(|num| !st.regions.contains_key(num))
            .ok_or(HostError::Exhausted)?;
        st.regions.insert(num, name.into());
        Ok(num)
    }

    fn create_class(&self, name: &str) -> Result<ClassId, HostError> {
        let mut st = self.lock();
        st.check(InitStep::CreateClass)?;
        if st.classes.values().any(|n| n == name) {
            return Err(HostError::AlreadyRegistered(name.into()));
        }
        let id = ClassId(st.next_class);
        st.next_class += 1;
        st.classes.insert(id, name.into());
        Ok(id)
    }

    fn create_node(&self, class: ClassId, num: DevNum, name: &str) -> Result<PathBuf, HostError> {
        let mut st = self.lock();
        st.check(InitStep::CreateNode)?;
        if !st.classes.contains_key(&class) || !st.regions.contains_key(&num) {
            return Err(HostError::Refused);
        }
        let path = Path::new(DEV_DIR).join(name);
        if st.nodes.contains_key(&path) {
            return Err(HostError::AlreadyRegistered(path.display().to_string()));
        }
        st.nodes.insert(path.clone(), (class, num));
        Ok(path)
    }

    fn add_device(&self, num: DevNum) -> Result<(), HostError> {
        let mut st = self.lock();
        st.check(InitStep::PublishDevice)?;
        if !st.regions.contains_key(&num) {
            return Err(HostError::Refused);
        }
        st.live.insert(num);
        Ok(())
    }

    fn remove_device(&self, num: DevNum) {
        let mut st = self.lock();
        if !st.live.remove(&num) {
            st.fault(format_args!("device {num}"));
        }
    }

    fn destroy_node(&self, class: ClassId, num: DevNum) {
        let mut st = self.lock();
        let before = st.nodes.len();
        st.nodes.retain(|_, owner| *owner != (class, num));
        if st.nodes.len() == before {
            st.fault(format_args!("node for {num} in class {}", class.0));
        }
    }

    fn destroy_class(&self, class: ClassId) {
        let mut st = self.lock();
        if st.classes.remove(&class).is_none() {
            st.fault(format_args!("class {}", class.0));
        }
    }

    fn release_region(&self, num: DevNum) {
        let mut st = self.lock();
        if st.regions.remove(&num).is_none() {
            st.fault(format_args!("region {num}"));
        }
    }

    fn lookup(&self, path: &Path) -> Option<DevNum> {
        let st = self.lock();
        st.nodes.get(path).map(|(_, num)| *num).filter(|num| st.live.contains(num))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_unique_per_region() {
        let host = InMemoryHost::new();
        let a = host.alloc_region("a").unwrap();
        let b = host.alloc_region("b").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.major, FIRST_DYNAMIC_MAJOR);
        assert_eq!(
            host.alloc_region("a"),
            Err(HostError::AlreadyRegistered("a".into()))
        );
    }

    #[test]
    fn node_resolves_only_once_published() {
        let host = InMemoryHost::new();
        let num = host.alloc_region("dev").unwrap();
        let class = host.create_class("dev").unwrap();
        let path = host.create_node(class, num, "dev").unwrap();
        assert_eq!(path, Path::new("/dev/dev"));
        assert_eq!(host.lookup(&path), None);

        host.add_device(num).unwrap();
        assert_eq!(host.lookup(&path), Some(num));
    }

    #[test]
    fn double_release_is_counted() {
        let host = InMemoryHost::new();
        let num = host.alloc_region("dev").unwrap();
        host.release_region(num);
        assert_eq!(host.faults(), 0);
        host.release_region(num);
        assert_eq!(host.faults(), 1);
        assert!(host.is_clean());
    }

    #[test]
    fn node_release_must_name_its_class() {
        let host = InMemoryHost::new();
        let num = host.alloc_region("dev").unwrap();
        let class = host.create_class("dev").unwrap();
        let other = host.create_class("other").unwrap();
        host.create_node(class, num, "dev").unwrap();

        host.destroy_node(other, num);
        assert_eq!(host.faults(), 1);
        assert_eq!(host.node_count(), 1);

        host.destroy_node(class, num);
        assert_eq!(host.faults(), 1);
        assert_eq!(host.node_count(), 0);
    }

    #[test]
    fn armed_step_is_refused() {
        let host = InMemoryHost::new();
        host.fail_at(InitStep::CreateClass);
        assert_eq!(host.create_class("x"), Err(HostError::Refused));
        host.clear_failure(InitStep::CreateClass);
        assert!(host.create_class("x").is_ok());
    }
}
