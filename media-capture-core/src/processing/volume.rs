//! Sound level computation for volume meters.
//!
//! Pure math over `&[f32]` buffers, no platform dependencies. Backends that
//! implement `VolumeMeter` feed raw channel buffers through
//! [`VolumeTracker`] and report the result.

/// RMS of the samples around their mean, so a DC offset does not read as sound.
pub fn centered_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let count = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / count;
    let sum_sq: f32 = samples.iter().map(|s| (s - mean) * (s - mean)).sum();
    (sum_sq / count).sqrt()
}

/// Volume over a set of channel buffers as a 0–100 integer.
///
/// Takes the loudest channel. Returns `None` when there are no channels.
pub fn volume_percent(channels: &[&[f32]]) -> Option<u32> {
    let loudest = channels
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| centered_rms(c))
        .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |a| a.max(v))))?;
    Some((loudest * 100.0).round().clamp(0.0, 100.0) as u32)
}

/// Remembers the last reported volume and only yields changes.
#[derive(Debug, Clone, Default)]
pub struct VolumeTracker {
    last: Option<u32>,
}

impl VolumeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, channels: &[&[f32]]) -> Option<u32> {
        let volume = volume_percent(channels)?;
        if self.last == Some(volume) {
            return None;
        }
        self.last = Some(volume);
        Some(volume)
    }
}
