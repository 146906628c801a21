//! Software volume control over signed 16-bit PCM.

/// Default volume level (unity gain).
pub const DEFAULT_LEVEL: f64 = 1.0;
/// Default increment used by [`Volume::raise`] and [`Volume::lower`].
pub const DEFAULT_STEP: f64 = 0.1;
/// Default upper bound (200%).
pub const DEFAULT_MAX: f64 = 2.0;

/// Scale each sample by `level`, truncating toward zero.
///
/// Values outside the `i16` range saturate.
pub fn adjust_volume(samples: &mut [i16], level: f64) {
    for sample in samples.iter_mut() {
        *sample = (f64::from(*sample) * level) as i16;
    }
}

/// Scale little-endian interleaved 16-bit PCM bytes in place.
///
/// A trailing odd byte is left untouched.
pub fn adjust_volume_bytes(data: &mut [u8], level: f64) {
    for pair in data.chunks_exact_mut(2) {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        let adjusted = (f64::from(sample) * level) as i16;
        pair.copy_from_slice(&adjusted.to_le_bytes());
    }
}

/// A bounded volume level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    level: f64,
    step: f64,
    max: f64,
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL, DEFAULT_STEP, DEFAULT_MAX)
    }
}

impl Volume {
    /// Create a volume; `level` is clamped to `[0, max]`.
    pub fn new(level: f64, step: f64, max: f64) -> Self {
        let max = max.max(0.0);
        Self {
            level: level.clamp(0.0, max),
            step,
            max,
        }
    }

    /// Current gain factor.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Upper bound of the gain factor.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Current level as a whole percentage.
    pub fn percent(&self) -> u32 {
        (self.level * 100.0).round() as u32
    }

    /// Increase by one step, capped at the maximum.
    pub fn raise(&mut self) -> f64 {
        self.level = round_level((self.level + self.step).min(self.max));
        self.level
    }

    /// Decrease by one step, floored at zero.
    pub fn lower(&mut self) -> f64 {
        self.level = round_level((self.level - self.step).max(0.0));
        self.level
    }
}

/// Drop floating-point drift from repeated stepping.
fn round_level(level: f64) -> f64 {
    (level * 1e6).round() / 1e6
}
