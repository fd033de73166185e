//! # media-capture-sim
//!
//! In-memory platform backend for media-capture-kit.
//!
//! Provides:
//! - `SimulatedDevices`: device list, hot-plug, permissions, stream handout
//! - `SimStream` / `SimTrack`: streams that count their stops
//! - `SimRecorderFactory`: recorders driven by hand, with deferred acks
//! - `SimSurfaceFactory`: snapshot surfaces with or without blob export
//! - `SimOrientation`: manually rotated display
//! - `SimVolumeMeter`: RMS volume meter fed with sample buffers
//!
//! ## Usage
//! ```ignore
//! use media_capture_core::{CaptureConfiguration, CaptureSession, Device};
//! use media_capture_sim::SimulatedPlatform;
//!
//! let sim = SimulatedPlatform::new(vec![Device::video("cam", "Front Camera")]);
//! let session = CaptureSession::start(sim.platform(), CaptureConfiguration::video_only())?;
//! ```

pub mod devices;
pub mod orientation;
pub mod recorder;
pub mod stream;
pub mod surface;
pub mod volume;

pub use devices::{SimulatedDevices, DEFAULT_FRAME_SIZE};
pub use orientation::SimOrientation;
pub use recorder::{SimRecorder, SimRecorderFactory};
pub use stream::{SimStream, SimTrack};
pub use surface::{SimSurface, SimSurfaceFactory};
pub use volume::SimVolumeMeter;

use std::sync::Arc;

use media_capture_core::models::device::Device;
use media_capture_core::traits::platform::Platform;

/// A full set of simulated collaborators.
///
/// Fields are shared handles: keep the `SimulatedPlatform` around to drive
/// and inspect the platform while a session runs on it.
#[derive(Clone)]
pub struct SimulatedPlatform {
    pub devices: Arc<SimulatedDevices>,
    pub recorders: Arc<SimRecorderFactory>,
    pub surfaces: Arc<SimSurfaceFactory>,
    pub orientation: Arc<SimOrientation>,
    pub volume: Arc<SimVolumeMeter>,
}

impl SimulatedPlatform {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices: Arc::new(SimulatedDevices::new(devices)),
            recorders: Arc::new(SimRecorderFactory::new()),
            surfaces: Arc::new(SimSurfaceFactory::new()),
            orientation: Arc::new(SimOrientation::new(0)),
            volume: Arc::new(SimVolumeMeter::new()),
        }
    }

    /// The collaborator bundle a `CaptureSession` runs against.
    pub fn platform(&self) -> Platform {
        Platform::new(
            self.devices.clone(),
            self.recorders.clone(),
            self.surfaces.clone(),
        )
        .with_orientation(self.orientation.clone())
        .with_volume_meter(self.volume.clone())
    }
}
