//! MotionPipeline for turning frames into persistent boxes.

use std::ops::ControlFlow;

use tracing::{debug_span, trace, warn};

use crate::config::PipelineConfig;
use crate::error::{ConfigError, FrameError};
use crate::segmentation::{BackgroundSubtractor, BoxScaler, Frame, RegionExtractor};
use crate::tracker::{BoundingBox, PersistenceTracker};

use super::FrameSource;

/// Segment → extract → scale → track, for a single stream.
///
/// Owns the background model and the retained boxes; independent streams
/// need independent pipelines.
#[derive(Debug, Clone)]
pub struct MotionPipeline {
    segmenter: BackgroundSubtractor,
    extractor: RegionExtractor,
    scaler: BoxScaler,
    tracker: PersistenceTracker,
    last_timestamp: Option<f64>,
}

impl MotionPipeline {
    /// Create a new pipeline, validating the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            segmenter: BackgroundSubtractor::new(config.segmenter)?,
            extractor: RegionExtractor::new(config.extractor)?,
            scaler: BoxScaler::new(config.scale_factor)?,
            tracker: PersistenceTracker::new(config.tracker)?,
            last_timestamp: None,
        })
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config() -> Self {
        Self {
            segmenter: BackgroundSubtractor::default(),
            extractor: RegionExtractor::default(),
            scaler: BoxScaler::default(),
            tracker: PersistenceTracker::default(),
            last_timestamp: None,
        }
    }

    /// Process a single frame and return the boxes to draw on it.
    ///
    /// A frame stamped earlier than its predecessor is rejected without
    /// touching any state.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, FrameError> {
        let ts = frame.timestamp();
        if let Some(previous) = self.last_timestamp {
            if ts < previous {
                return Err(FrameError::NonMonotonicTimestamp {
                    previous,
                    current: ts,
                });
            }
        }
        self.last_timestamp = Some(ts);

        let _span = debug_span!("frame", ts).entered();

        let mask = self.segmenter.apply(frame);
        let regions = self.extractor.extract(&mask);
        let candidates =
            self.scaler.scale_all(&regions, frame.width() as u32, frame.height() as u32);
        trace!(
            regions = regions.len(),
            candidates = candidates.len(),
            "scaled candidates"
        );

        Ok(self.tracker.update(&candidates, ts))
    }

    /// Pull frames from `source` until it is exhausted or `sink` breaks.
    ///
    /// `sink` receives every processed frame with its boxes. Frames with
    /// out-of-order timestamps are skipped. Returns the number of frames
    /// processed.
    pub fn run<S, F>(&mut self, source: &mut S, mut sink: F) -> Result<usize, S::Error>
    where
        S: FrameSource,
        F: FnMut(&Frame, &[BoundingBox]) -> ControlFlow<()>,
    {
        let mut processed = 0;
        while let Some(frame) = source.next_frame()? {
            let boxes = match self.process_frame(&frame) {
                Ok(boxes) => boxes,
                Err(err) => {
                    warn!(%err, "skipping frame");
                    continue;
                }
            };
            processed += 1;
            if sink(&frame, &boxes).is_break() {
                break;
            }
        }
        Ok(processed)
    }

    /// Forget the background model and all retained boxes.
    pub fn reset(&mut self) {
        self.segmenter.reset();
        self.tracker.clear();
        self.last_timestamp = None;
    }

    /// Get a reference to the underlying segmenter.
    pub fn segmenter(&self) -> &BackgroundSubtractor {
        &self.segmenter
    }

    /// Get a reference to the underlying region extractor.
    pub fn extractor(&self) -> &RegionExtractor {
        &self.extractor
    }

    pub fn scaler(&self) -> &BoxScaler {
        &self.scaler
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &PersistenceTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut PersistenceTracker {
        &mut self.tracker
    }
}

impl Default for MotionPipeline {
    fn default() -> Self {
        Self::with_default_config()
    }
}
