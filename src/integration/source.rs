//! Trait for frame acquisition backends.

use std::convert::Infallible;

use crate::segmentation::Frame;

/// Supplies decoded frames, in stream order.
///
/// Implement this trait to connect a video decoder or capture device.
///
/// # Example
///
/// ```
/// use motion_persist::{Frame, FrameSource};
///
/// struct Blank {
///     index: usize,
/// }
///
/// impl FrameSource for Blank {
///     type Error = motion_persist::FrameError;
///
///     fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
///         if self.index == 3 {
///             return Ok(None);
///         }
///         self.index += 1;
///         Frame::filled(64, 48, 0, self.index as f64 * 0.04).map(Some)
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for acquisition failures.
    type Error;

    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error>;
}

/// Adapts any iterator of frames into a [`FrameSource`].
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    frames: I,
}

impl<I: Iterator<Item = Frame>> IterSource<I> {
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Frame>> FrameSource for IterSource<I> {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<Frame>, Self::Error> {
        Ok(self.frames.next())
    }
}
