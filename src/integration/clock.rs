use crate::error::ConfigError;

/// Derives frame timestamps, in seconds, from a constant frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
    index: u64,
}

impl FrameClock {
    pub fn new(fps: f64) -> Result<Self, ConfigError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ConfigError::FrameRate(fps));
        }
        Ok(Self { fps, index: 0 })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Duration of one frame.
    pub fn interval(&self) -> f64 {
        1.0 / self.fps
    }

    /// Timestamp of frame `index`, counting from zero.
    pub fn timestamp_for(&self, index: u64) -> f64 {
        index as f64 / self.fps
    }

    /// Timestamp of the next frame, advancing the clock.
    pub fn tick(&mut self) -> f64 {
        let ts = self.timestamp_for(self.index);
        self.index += 1;
        ts
    }
}
