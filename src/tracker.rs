mod matching;
mod persistence_tracker;
mod rect;
mod tracked_box;

pub use matching::{
    AssignmentResult, MatchStrategy, corner_distance, greedy_assignment, linear_assignment,
    merge_overlapping,
};
pub use persistence_tracker::{PersistenceTracker, TrackerConfig};
pub use rect::{BoundingBox, RawRegion};
pub use tracked_box::TrackedBox;
