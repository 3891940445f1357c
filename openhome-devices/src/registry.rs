//! Live device registry

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::device::Device;
use crate::identifier::DeviceId;

/// Devices currently reachable, keyed by identifier.
///
/// Cloning yields another handle onto the same store. Only the event router
/// writes; any number of readers may query concurrently.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    devices: Arc<RwLock<HashMap<DeviceId, Device>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a device by identifier.
    pub fn get(&self, id: &DeviceId) -> Option<Device> {
        self.devices.read().get(id).cloned()
    }

    /// Identifiers registered at the time of the call, in no particular order.
    pub fn list(&self) -> Vec<DeviceId> {
        self.devices.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.read().contains_key(id)
    }

    /// Insert a device, replacing any existing record for the same identifier.
    pub(crate) fn put(&self, id: DeviceId, device: Device) -> Option<Device> {
        self.devices.write().insert(id, device)
    }

    pub(crate) fn remove(&self, id: &DeviceId) -> Option<Device> {
        self.devices.write().remove(id)
    }
}
