use crate::models::config::CaptureConfiguration;
use crate::models::device::{Device, MediaKind};
use crate::models::error::CaptureError;
use crate::traits::media_devices::StreamConstraints;

/// Devices chosen for one acquisition, one per requested kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    pub video: Option<Device>,
    pub audio: Option<Device>,
}

impl DeviceSelection {
    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none()
    }

    pub fn constraints(&self) -> StreamConstraints {
        StreamConstraints {
            video_device_id: self.video.as_ref().map(|d| d.id.clone()),
            audio_device_id: self.audio.as_ref().map(|d| d.id.clone()),
        }
    }
}

/// Pick a device for each kind the configuration requests.
///
/// Per kind: an explicit `device_id` of that kind wins, then the
/// configuration's preference hint, then the first device of the kind.
/// Kinds without a device are left out; if nothing is left the call fails
/// with `NoMatchingDevice`.
pub fn select_devices(
    devices: &[Device],
    config: &CaptureConfiguration,
    device_id: Option<&str>,
) -> Result<DeviceSelection, CaptureError> {
    let hint = config.preferred_device.as_deref();
    let mut selection = DeviceSelection::default();
    for kind in config.requested_kinds() {
        let device = match_device(devices, kind, device_id, hint).cloned();
        match kind {
            MediaKind::Video => selection.video = device,
            MediaKind::Audio => selection.audio = device,
        }
    }

    if selection.is_empty() {
        return Err(CaptureError::NoMatchingDevice);
    }
    Ok(selection)
}

/// Choose one device of `kind`.
pub fn match_device<'a>(
    devices: &'a [Device],
    kind: MediaKind,
    device_id: Option<&str>,
    hint: Option<&str>,
) -> Option<&'a Device> {
    let mut candidates = devices.iter().filter(|d| d.kind == kind);

    if let Some(id) = device_id {
        if let Some(device) = candidates.clone().find(|d| d.id == id) {
            return Some(device);
        }
    }

    if let Some(hint) = hint {
        if let Some(device) = resolve_hint(devices, kind, hint) {
            return Some(device);
        }
    }

    candidates.next()
}

/// Resolve a preference hint such as `"front"`, `"back"` or a device id.
///
/// An exact id match wins; otherwise the label is searched
/// case-insensitively and the last matching device is returned.
pub fn resolve_hint<'a>(devices: &'a [Device], kind: MediaKind, hint: &str) -> Option<&'a Device> {
    let of_kind = || devices.iter().filter(move |d| d.kind == kind);

    if let Some(device) = of_kind().find(|d| d.id == hint) {
        return Some(device);
    }

    let needle = hint.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    of_kind()
        .filter(|d| d.label.to_lowercase().contains(&needle))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cameras() -> Vec<Device> {
        vec![
            Device::new("00001-1", "00001", MediaKind::Video, "Back facing camera"),
            Device::new("00002-1", "00002", MediaKind::Video, "Front facing camera"),
            Device::new("mic-1", "00001", MediaKind::Audio, "Built-in microphone"),
        ]
    }

    #[test]
    fn first_device_of_each_kind_by_default() {
        let selection = select_devices(&cameras(), &CaptureConfiguration::default(), None).unwrap();
        assert_eq!(selection.video.unwrap().id, "00001-1");
        assert_eq!(selection.audio.unwrap().id, "mic-1");
    }

    #[test]
    fn explicit_id_wins_for_its_kind_only() {
        let selection =
            select_devices(&cameras(), &CaptureConfiguration::default(), Some("00002-1")).unwrap();
        assert_eq!(selection.video.unwrap().id, "00002-1");
        assert_eq!(selection.audio.unwrap().id, "mic-1");
    }

    #[test]
    fn front_hint_matches_label_regardless_of_order() {
        let config = CaptureConfiguration {
            preferred_device: Some("front".into()),
            ..CaptureConfiguration::video_only()
        };
        let mut devices = cameras();
        assert_eq!(
            select_devices(&devices, &config, None).unwrap().video.unwrap().id,
            "00002-1"
        );

        devices.swap(0, 1);
        assert_eq!(
            select_devices(&devices, &config, None).unwrap().video.unwrap().id,
            "00002-1"
        );
    }

    #[test]
    fn later_devices_win_among_hint_matches() {
        let devices = vec![
            Device::video("a", "Back camera"),
            Device::video("b", "Back ultra wide camera"),
            Device::video("c", "Front camera"),
        ];
        assert_eq!(resolve_hint(&devices, MediaKind::Video, "BACK").unwrap().id, "b");
    }

    #[test]
    fn hint_may_name_a_device_id() {
        let devices = cameras();
        assert_eq!(
            resolve_hint(&devices, MediaKind::Video, "00001-1").unwrap().id,
            "00001-1"
        );
    }

    #[test]
    fn unmatched_hint_falls_back_to_first() {
        let config = CaptureConfiguration {
            preferred_device: Some("periscope".into()),
            ..CaptureConfiguration::video_only()
        };
        let selection = select_devices(&cameras(), &config, None).unwrap();
        assert_eq!(selection.video.unwrap().id, "00001-1");
    }

    #[test]
    fn missing_kind_is_omitted() {
        let devices = vec![Device::audio("mic", "Mic")];
        let selection = select_devices(&devices, &CaptureConfiguration::default(), None).unwrap();
        assert!(selection.video.is_none());
        assert_eq!(selection.constraints().audio_device_id.as_deref(), Some("mic"));
    }

    #[test]
    fn nothing_matches() {
        let devices = vec![Device::audio("mic", "Mic")];
        assert_eq!(
            select_devices(&devices, &CaptureConfiguration::video_only(), None),
            Err(CaptureError::NoMatchingDevice)
        );
        assert_eq!(
            select_devices(&[], &CaptureConfiguration::default(), None),
            Err(CaptureError::NoMatchingDevice)
        );
    }

    #[test]
    fn unknown_explicit_id_falls_back() {
        let selection =
            select_devices(&cameras(), &CaptureConfiguration::video_only(), Some("gone")).unwrap();
        assert_eq!(selection.video.unwrap().id, "00001-1");
    }
}
