pub mod media_devices;
pub mod orientation;
pub mod platform;
pub mod recorder;
pub mod surface;
pub mod volume;
