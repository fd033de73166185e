use std::collections::HashSet;
use std::sync::Arc;

use crate::events::{Listener, Subscription};
use crate::models::device::{Device, MediaKind, PermissionState};
use crate::models::error::CaptureError;
use crate::traits::media_devices::MediaDevices;

/// Something about the device registry changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    DevicesChanged,
    PermissionChanged(MediaKind, PermissionState),
}

/// Result of one enumeration. Never an error: a failed enumeration yields
/// an empty list and the failure in `error`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enumeration {
    pub devices: Vec<Device>,
    pub error: Option<CaptureError>,
}

/// Watches the platform device registry.
///
/// Holds the device-change and permission-change subscriptions; dropping
/// the watcher (or calling [`DeviceWatcher::detach`]) releases them.
pub struct DeviceWatcher {
    devices: Arc<dyn MediaDevices>,
    subscriptions: Vec<Subscription>,
}

impl DeviceWatcher {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        Self {
            devices,
            subscriptions: Vec::new(),
        }
    }

    /// Forward device-list changes and permission changes for `kinds` to `listener`.
    pub fn watch(&mut self, kinds: &[MediaKind], listener: Listener<WatchEvent>) {
        let on_change = Arc::clone(&listener);
        self.subscriptions
            .push(self.devices.on_device_change(Arc::new(move |()| {
                on_change(WatchEvent::DevicesChanged)
            })));

        for &kind in kinds {
            let on_permission = Arc::clone(&listener);
            self.subscriptions.push(self.devices.on_permission_change(
                kind,
                Arc::new(move |state| on_permission(WatchEvent::PermissionChanged(kind, state))),
            ));
        }
        log::debug!(
            "watching device changes and {} permission(s)",
            kinds.len()
        );
    }

    pub fn detach(&mut self) {
        self.subscriptions.clear();
    }
}

/// Enumerate devices, deduplicated by id in system order.
pub async fn enumerate(devices: &dyn MediaDevices) -> Enumeration {
    match devices.enumerate_devices().await {
        Ok(list) => Enumeration {
            devices: dedupe(list),
            error: None,
        },
        Err(err) => {
            log::warn!("device enumeration failed: {}", err);
            let err = match err {
                CaptureError::EnumerationFailure(_) | CaptureError::PermissionDenied => err,
                other => CaptureError::EnumerationFailure(other.to_string()),
            };
            Enumeration {
                devices: Vec::new(),
                error: Some(err),
            }
        }
    }
}

/// Drop repeated ids, keeping the first occurrence.
pub fn dedupe(devices: Vec<Device>) -> Vec<Device> {
    let mut seen = HashSet::new();
    devices
        .into_iter()
        .filter(|d| seen.insert(d.id.clone()))
        .collect()
}

/// Devices in `current` that were not in `previous`, in `current` order.
pub fn added_devices<'a>(previous: &[Device], current: &'a [Device]) -> Vec<&'a Device> {
    let known: HashSet<&str> = previous.iter().map(|d| d.id.as_str()).collect();
    current
        .iter()
        .filter(|d| !known.contains(d.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first() {
        let list = vec![
            Device::video("a", "Front"),
            Device::audio("m", "Mic"),
            Device::video("a", "Front (again)"),
        ];
        let out = dedupe(list);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "Front");
        assert_eq!(out[1].id, "m");
    }

    #[test]
    fn added_devices_in_order() {
        let before = vec![Device::video("a", "A")];
        let after = vec![
            Device::video("b", "B"),
            Device::video("a", "A"),
            Device::audio("c", "C"),
        ];
        let added: Vec<&str> = added_devices(&before, &after)
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(added, vec!["b", "c"]);
    }

    #[test]
    fn nothing_added_when_lists_match() {
        let list = vec![Device::video("a", "A")];
        assert!(added_devices(&list, &list).is_empty());
    }
}
