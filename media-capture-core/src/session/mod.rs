mod controller;
mod live_set;
mod machine;

pub use controller::{CaptureSession, RecordOptions};
