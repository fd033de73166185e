use crate::events::{Listener, Subscription};

/// Source of display orientation, in degrees.
pub trait OrientationSource: Send + Sync {
    fn current_angle(&self) -> u16;

    fn on_orientation_change(&self, listener: Listener<u16>) -> Subscription;
}
