use std::sync::Arc;

use crate::events::{Listener, Subscription};
use crate::models::error::CaptureError;
use crate::traits::media_devices::MediaStream;

/// Sound level meter attached to an audio stream.
///
/// Measurements are reported as 0–100 and only when the level changes.
pub trait VolumeMeter: Send + Sync {
    fn watch(
        &self,
        stream: Arc<dyn MediaStream>,
        listener: Listener<u32>,
    ) -> Result<Subscription, CaptureError>;
}
