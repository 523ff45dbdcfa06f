//! Integration module for driving the tracker from a frame stream.
//!
//! Frame acquisition and rendering live outside this crate. This module
//! provides the seam for the former ([`FrameSource`]) and a pipeline that
//! turns frames into boxes to draw.

mod clock;
mod pipeline;
mod source;

pub use clock::FrameClock;
pub use pipeline::MotionPipeline;
pub use source::{FrameSource, IterSource};
