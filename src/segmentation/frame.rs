use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use crate::error::FrameError;

/// A decoded luminance frame and its timestamp.
///
/// Pixels are stored row-major with shape `(height, width)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array2<u8>,
    timestamp: f64,
}

impl Frame {
    pub fn new(pixels: Array2<u8>, timestamp: f64) -> Result<Self, FrameError> {
        if pixels.is_empty() {
            return Err(FrameError::Empty);
        }
        check_timestamp(timestamp)?;
        Ok(Self { pixels, timestamp })
    }

    /// Build a frame from a raw row-major luminance buffer.
    pub fn from_raw(
        data: Vec<u8>,
        width: usize,
        height: usize,
        timestamp: f64,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty);
        }
        check_timestamp(timestamp)?;
        let expected = width * height;
        let got = data.len();
        let pixels = Array2::from_shape_vec((height, width), data)
            .map_err(|_| FrameError::BufferSize { expected, got })?;
        Ok(Self { pixels, timestamp })
    }

    /// Uniform frame, mostly useful as a starting canvas.
    pub fn filled(
        width: usize,
        height: usize,
        value: u8,
        timestamp: f64,
    ) -> Result<Self, FrameError> {
        Self::new(Array2::from_elem((height, width), value), timestamp)
    }

    pub fn pixels(&self) -> ArrayView2<'_, u8> {
        self.pixels.view()
    }

    pub fn pixels_mut(&mut self) -> ArrayViewMut2<'_, u8> {
        self.pixels.view_mut()
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// `(height, width)`, matching the pixel array shape.
    pub fn dim(&self) -> (usize, usize) {
        self.pixels.dim()
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

fn check_timestamp(timestamp: f64) -> Result<(), FrameError> {
    if timestamp.is_finite() {
        Ok(())
    } else {
        Err(FrameError::Timestamp(timestamp))
    }
}
