//! Aggregate configuration for a [`MotionPipeline`](crate::MotionPipeline).
//!
//! Every field has a default, so partial documents deserialize:
//!
//! ```
//! use motion_persist::PipelineConfig;
//!
//! let config: PipelineConfig =
//!     serde_json::from_str(r#"{ "scale_factor": 10.0, "tracker": { "persistence_time": 2.0 } }"#)
//!         .unwrap();
//! assert_eq!(config.scale_factor, 10.0);
//! assert_eq!(config.tracker.match_distance, 50.0);
//! assert_eq!(config.segmenter.history, 500);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::segmentation::{BoxScaler, ExtractorConfig, SegmenterConfig};
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub segmenter: SegmenterConfig,
    pub extractor: ExtractorConfig,
    /// Enlargement applied to each region around its centre.
    pub scale_factor: f64,
    pub tracker: TrackerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            extractor: ExtractorConfig::default(),
            scale_factor: BoxScaler::DEFAULT_FACTOR,
            tracker: TrackerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.segmenter.validate()?;
        self.extractor.validate()?;
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(ConfigError::ScaleFactor(self.scale_factor));
        }
        self.tracker.validate()
    }
}
