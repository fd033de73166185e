use std::sync::Arc;

use super::media_devices::MediaDevices;
use super::orientation::OrientationSource;
use super::recorder::RecorderFactory;
use super::surface::SurfaceFactory;
use super::volume::VolumeMeter;

/// The set of platform collaborators a capture session runs against.
///
/// Orientation and volume metering are optional: without an orientation
/// source the frame box never rotates, and without a meter `watch_volume`
/// has no effect.
#[derive(Clone)]
pub struct Platform {
    pub devices: Arc<dyn MediaDevices>,
    pub recorders: Arc<dyn RecorderFactory>,
    pub surfaces: Arc<dyn SurfaceFactory>,
    pub orientation: Option<Arc<dyn OrientationSource>>,
    pub volume: Option<Arc<dyn VolumeMeter>>,
}

impl Platform {
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        recorders: Arc<dyn RecorderFactory>,
        surfaces: Arc<dyn SurfaceFactory>,
    ) -> Self {
        Self {
            devices,
            recorders,
            surfaces,
            orientation: None,
            volume: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Arc<dyn OrientationSource>) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_volume_meter(mut self, meter: Arc<dyn VolumeMeter>) -> Self {
        self.volume = Some(meter);
        self
    }
}
