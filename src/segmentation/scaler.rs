use crate::error::ConfigError;
use crate::tracker::{BoundingBox, RawRegion};

/// Enlarges regions around their centre and clamps them to the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxScaler {
    factor: f64,
}

impl BoxScaler {
    pub const DEFAULT_FACTOR: f64 = 7.0;

    pub fn new(factor: f64) -> Result<Self, ConfigError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ConfigError::ScaleFactor(factor));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Scale `region` by the configured factor inside a
    /// `frame_width × frame_height` frame.
    ///
    /// Fractional edges round outwards. Returns `None` when clamping leaves
    /// no positive extent on either axis.
    pub fn scale(
        &self,
        region: &RawRegion,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<BoundingBox> {
        let centre = region.centroid();
        let half_width = region.width as f64 * self.factor / 2.0;
        let half_height = region.height as f64 * self.factor / 2.0;

        let x1 = (centre.x - half_width).floor().max(0.0);
        let y1 = (centre.y - half_height).floor().max(0.0);
        let x2 = (centre.x + half_width).ceil().min(frame_width as f64);
        let y2 = (centre.y + half_height).ceil().min(frame_height as f64);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(BoundingBox::new(x1 as u32, y1 as u32, x2 as u32, y2 as u32))
    }

    /// Scale every region, dropping the degenerate ones.
    pub fn scale_all(
        &self,
        regions: &[RawRegion],
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<BoundingBox> {
        regions
            .iter()
            .filter_map(|r| self.scale(r, frame_width, frame_height))
            .collect()
    }
}

impl Default for BoxScaler {
    fn default() -> Self {
        Self {
            factor: Self::DEFAULT_FACTOR,
        }
    }
}
