use parking_lot::Mutex;

use media_capture_core::events::{EventRegistry, Listener, Subscription};
use media_capture_core::traits::orientation::OrientationSource;

/// A display whose rotation is set by hand.
#[derive(Default)]
pub struct SimOrientation {
    angle: Mutex<u16>,
    changes: EventRegistry<u16>,
}

impl SimOrientation {
    pub fn new(angle: u16) -> Self {
        Self {
            angle: Mutex::new(angle),
            changes: EventRegistry::new(),
        }
    }

    /// Rotate the display to `angle` degrees and notify listeners.
    pub fn rotate(&self, angle: u16) {
        *self.angle.lock() = angle;
        log::debug!("sim: display rotated to {}°", angle);
        self.changes.emit(angle);
    }

    pub fn listener_count(&self) -> usize {
        self.changes.len()
    }
}

impl OrientationSource for SimOrientation {
    fn current_angle(&self) -> u16 {
        *self.angle.lock()
    }

    fn on_orientation_change(&self, listener: Listener<u16>) -> Subscription {
        self.changes.subscribe(listener)
    }
}
