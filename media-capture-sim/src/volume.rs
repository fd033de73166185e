//! Reference volume meter.
//!
//! Tests feed raw sample buffers per stream; the meter computes the level
//! with the core's RMS helpers and reports changes to the stream's watchers.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use media_capture_core::events::{EventRegistry, Listener, Subscription};
use media_capture_core::models::error::CaptureError;
use media_capture_core::processing::volume::VolumeTracker;
use media_capture_core::traits::media_devices::MediaStream;
use media_capture_core::traits::volume::VolumeMeter;

#[derive(Default)]
struct Meter {
    tracker: VolumeTracker,
    listeners: EventRegistry<u32>,
}

type Meters = Arc<Mutex<HashMap<String, Meter>>>;

/// Per-stream meters. A stream's entry is dropped with its last watcher.
#[derive(Default)]
pub struct SimVolumeMeter {
    meters: Meters,
}

impl SimVolumeMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one buffer per channel for `stream_id`.
    ///
    /// Returns the level reported to watchers, or `None` when it did not
    /// change or nobody watches the stream.
    pub fn feed(&self, stream_id: &str, channels: &[&[f32]]) -> Option<u32> {
        let (level, listeners) = {
            let mut meters = self.meters.lock();
            let meter = meters.get_mut(stream_id)?;
            if meter.listeners.is_empty() {
                return None;
            }
            (meter.tracker.update(channels)?, meter.listeners.clone())
        };
        listeners.emit(level);
        Some(level)
    }

    /// Watchers attached to `stream_id`.
    pub fn watcher_count(&self, stream_id: &str) -> usize {
        self.meters
            .lock()
            .get(stream_id)
            .map_or(0, |meter| meter.listeners.len())
    }

    /// Streams that currently have a meter.
    pub fn metered_streams(&self) -> usize {
        self.meters.lock().len()
    }
}

impl VolumeMeter for SimVolumeMeter {
    fn watch(
        &self,
        stream: Arc<dyn MediaStream>,
        listener: Listener<u32>,
    ) -> Result<Subscription, CaptureError> {
        let stream_id = stream.id().to_string();
        let subscription = self
            .meters
            .lock()
            .entry(stream_id.clone())
            .or_default()
            .listeners
            .subscribe(listener);

        let meters: Weak<Mutex<HashMap<String, Meter>>> = Arc::downgrade(&self.meters);
        Ok(Subscription::new(move || {
            subscription.cancel();
            if let Some(meters) = meters.upgrade() {
                let mut meters = meters.lock();
                if meters
                    .get(&stream_id)
                    .is_some_and(|meter| meter.listeners.is_empty())
                {
                    meters.remove(&stream_id);
                }
            }
        }))
    }
}
