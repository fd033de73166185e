use crate::models::device::FrameSize;

/// Tracks display orientation and the expected frame box.
///
/// A change that crosses an odd number of quarter turns swaps width and
/// height. Half turns leave the box alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationTracker {
    angle: u16,
}

impl OrientationTracker {
    pub fn new(angle: u16) -> Self {
        Self {
            angle: normalize(angle),
        }
    }

    pub fn angle(&self) -> u16 {
        self.angle
    }

    /// Record a new angle. Returns whether the change is an odd multiple
    /// of 90°.
    pub fn update(&mut self, angle: u16) -> bool {
        let angle = normalize(angle);
        let delta = (angle + 360 - self.angle) % 360;
        self.angle = angle;
        delta % 90 == 0 && (delta / 90) % 2 == 1
    }

    /// Record a new angle and return the new frame box, or `None` when the
    /// box is unchanged.
    pub fn rotate(&mut self, angle: u16, current: FrameSize) -> Option<FrameSize> {
        if !self.update(angle) {
            return None;
        }
        let swapped = current.swapped();
        (swapped != current).then_some(swapped)
    }
}

fn normalize(angle: u16) -> u16 {
    angle % 360
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_swaps() {
        let mut tracker = OrientationTracker::new(0);
        let size = FrameSize::new(640, 480);
        assert_eq!(tracker.rotate(90, size), Some(FrameSize::new(480, 640)));
        assert_eq!(tracker.angle(), 90);
    }

    #[test]
    fn half_turn_is_noop() {
        let mut tracker = OrientationTracker::new(90);
        assert_eq!(tracker.rotate(270, FrameSize::new(480, 640)), None);
        assert_eq!(tracker.angle(), 270);
    }

    #[test]
    fn wraps_through_zero() {
        let mut tracker = OrientationTracker::new(270);
        assert!(tracker.update(0));
        assert!(tracker.update(90));
        assert!(!tracker.update(270));
        assert!(!tracker.update(630));
    }

    #[test]
    fn partial_turn_keeps_box() {
        let mut tracker = OrientationTracker::new(0);
        let size = FrameSize::new(640, 480);
        assert_eq!(tracker.rotate(45, size), None);
        assert_eq!(tracker.angle(), 45);
        assert_eq!(tracker.rotate(135, size), Some(FrameSize::new(480, 640)));
    }

    #[test]
    fn square_frames_never_change() {
        let mut tracker = OrientationTracker::new(0);
        assert_eq!(tracker.rotate(90, FrameSize::new(500, 500)), None);
    }

    #[test]
    fn same_angle_is_noop() {
        let mut tracker = OrientationTracker::new(180);
        assert!(!tracker.update(180));
    }
}
