use crate::tracker::rect::BoundingBox;

/// A retained box and the time it was last matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedBox {
    /// Most recently matched box
    pub bbox: BoundingBox,
    /// Timestamp of the last match, in the stream's time domain
    pub last_seen: f64,
}

impl TrackedBox {
    pub fn new(bbox: BoundingBox, now: f64) -> Self {
        Self {
            bbox,
            last_seen: now,
        }
    }

    /// Replace the box with a fresh match.
    pub fn refresh(&mut self, bbox: BoundingBox, now: f64) {
        self.bbox = bbox;
        self.last_seen = now;
    }

    /// Time elapsed since the last match.
    pub fn age(&self, now: f64) -> f64 {
        now - self.last_seen
    }

    pub fn is_alive(&self, now: f64, persistence_time: f64) -> bool {
        self.age(now) < persistence_time
    }
}
