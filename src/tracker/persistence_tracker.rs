//! Time-windowed retention of matched candidate boxes.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::tracker::matching::{self, AssignmentResult, MatchStrategy};
use crate::tracker::rect::BoundingBox;
use crate::tracker::tracked_box::TrackedBox;

/// Configuration for the PersistenceTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum top-left corner displacement, in pixels, for a candidate to match a retained box.
    pub match_distance: f64,
    /// How long a box survives after its last match.
    pub persistence_time: f64,
    /// IoU at which two candidates are merged into their union.
    pub overlap_threshold: f32,
    pub merge_candidates: bool,
    pub match_strategy: MatchStrategy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_distance: 50.0,
            persistence_time: 1.0,
            overlap_threshold: 0.5,
            merge_candidates: true,
            match_strategy: MatchStrategy::Greedy,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.match_distance.is_finite() && self.match_distance > 0.0) {
            return Err(ConfigError::MatchDistance(self.match_distance));
        }
        if !(self.persistence_time.is_finite() && self.persistence_time > 0.0) {
            return Err(ConfigError::PersistenceTime(self.persistence_time));
        }
        if !(self.overlap_threshold > 0.0 && self.overlap_threshold <= 1.0) {
            return Err(ConfigError::OverlapThreshold(self.overlap_threshold));
        }
        Ok(())
    }
}

/// Keeps candidate boxes alive for `persistence_time` after their last match.
#[derive(Debug, Clone)]
pub struct PersistenceTracker {
    tracked: Vec<TrackedBox>,
    config: TrackerConfig,
}

impl PersistenceTracker {
    /// Create a tracker, rejecting out-of-range settings.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tracked: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Boxes currently retained, in retention order.
    pub fn tracked(&self) -> &[TrackedBox] {
        &self.tracked
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Forget every retained box.
    pub fn clear(&mut self) {
        self.tracked.clear();
    }

    /// Merge this frame's candidates into the retained set and return the
    /// boxes to draw at `current_time`.
    ///
    /// Matched entries take the candidate's box and are stamped with
    /// `current_time`; when several candidates match one entry the last one
    /// wins. Unmatched candidates become new entries. Entries whose
    /// last match is `persistence_time` or more in the past are then dropped.
    pub fn update(&mut self, candidates: &[BoundingBox], current_time: f64) -> Vec<BoundingBox> {
        let candidates = if self.config.merge_candidates {
            matching::merge_overlapping(candidates, self.config.overlap_threshold)
        } else {
            candidates.to_vec()
        };

        let tracked_rects: Vec<BoundingBox> = self.tracked.iter().map(|t| t.bbox).collect();

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = match self.config.match_strategy {
            MatchStrategy::Greedy => matching::greedy_assignment(
                &tracked_rects,
                &candidates,
                self.config.match_distance,
            ),
            MatchStrategy::Optimal => {
                let dists = matching::corner_distance(&tracked_rects, &candidates);
                matching::linear_assignment(&dists, self.config.match_distance)
            }
        };

        let refreshed = matches.len();
        for (itracked, icand) in matches {
            self.tracked[itracked].refresh(candidates[icand], current_time);
        }

        let created = unmatched_detections.len();
        for icand in unmatched_detections {
            self.tracked.push(TrackedBox::new(candidates[icand], current_time));
        }

        let before = self.tracked.len();
        let persistence_time = self.config.persistence_time;
        self.tracked.retain(|t| t.is_alive(current_time, persistence_time));
        let evicted = before - self.tracked.len();

        trace!(
            candidates = candidates.len(),
            refreshed,
            stale = unmatched_tracks.len(),
            "matched candidates"
        );
        if created > 0 || evicted > 0 {
            debug!(created, evicted, retained = self.tracked.len(), "tracked set changed");
        }

        self.tracked.iter().map(|t| t.bbox).collect()
    }
}

impl Default for PersistenceTracker {
    fn default() -> Self {
        Self {
            tracked: Vec::new(),
            config: TrackerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_candidate_is_retained() {
        let mut tracker = PersistenceTracker::default();
        let out = tracker.update(&[BoundingBox::new(5, 5, 25, 25)], 0.0);
        assert_eq!(out, vec![BoundingBox::new(5, 5, 25, 25)]);
        assert_eq!(tracker.tracked()[0].last_seen, 0.0);
    }

    #[test]
    fn test_match_replaces_box_and_refreshes() {
        let mut tracker = PersistenceTracker::default();
        tracker.update(&[BoundingBox::new(5, 5, 25, 25)], 0.0);
        let out = tracker.update(&[BoundingBox::new(6, 6, 26, 26)], 0.1);

        assert_eq!(out, vec![BoundingBox::new(6, 6, 26, 26)]);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.tracked()[0].last_seen, 0.1);
    }

    #[test]
    fn test_far_candidate_creates_entry() {
        let mut tracker = PersistenceTracker::default();
        tracker.update(&[BoundingBox::new(0, 0, 20, 20)], 0.0);
        let out = tracker.update(&[BoundingBox::new(200, 200, 220, 220)], 0.5);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_eviction_boundary() {
        let mut tracker = PersistenceTracker::default();
        tracker.update(&[BoundingBox::new(0, 0, 20, 20)], 0.0);

        assert_eq!(tracker.update(&[], 0.999).len(), 1);
        assert!(tracker.update(&[], 1.0).is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_unmatched_entries_survive_within_window() {
        let mut tracker = PersistenceTracker::default();
        tracker.update(&[BoundingBox::new(0, 0, 20, 20)], 0.0);
        let out = tracker.update(&[BoundingBox::new(300, 300, 320, 320)], 0.5);
        assert!(out.contains(&BoundingBox::new(0, 0, 20, 20)));

        let out = tracker.update(&[BoundingBox::new(301, 301, 321, 321)], 1.2);
        assert_eq!(out, vec![BoundingBox::new(301, 301, 321, 321)]);
    }

    #[test]
    fn test_candidates_merged_before_matching() {
        let mut tracker = PersistenceTracker::default();
        let out = tracker.update(
            &[BoundingBox::new(0, 0, 10, 10), BoundingBox::new(1, 1, 11, 11)],
            0.0,
        );
        assert_eq!(out, vec![BoundingBox::new(0, 0, 11, 11)]);
    }

    #[test]
    fn test_merge_disabled() {
        let mut tracker = PersistenceTracker::new(TrackerConfig {
            merge_candidates: false,
            ..Default::default()
        })
        .unwrap();
        let out = tracker.update(
            &[BoundingBox::new(0, 0, 10, 10), BoundingBox::new(1, 1, 11, 11)],
            0.0,
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_custom_match_distance() {
        let mut tracker = PersistenceTracker::new(TrackerConfig {
            match_distance: 5.0,
            ..Default::default()
        })
        .unwrap();
        tracker.update(&[BoundingBox::new(0, 0, 20, 20)], 0.0);
        let out = tracker.update(&[BoundingBox::new(10, 0, 30, 20)], 0.1);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig {
            persistence_time: 0.0,
            ..Default::default()
        };
        assert_eq!(
            PersistenceTracker::new(config).unwrap_err(),
            ConfigError::PersistenceTime(0.0)
        );
    }
}
