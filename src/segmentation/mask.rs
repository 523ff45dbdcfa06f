use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2};

/// Classification of a single pixel against the background model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelClass {
    Background,
    /// Darker copy of the background; never part of a region
    Shadow,
    Foreground,
}

impl PixelClass {
    pub const BACKGROUND_VALUE: u8 = 0;
    pub const SHADOW_VALUE: u8 = 127;
    pub const FOREGROUND_VALUE: u8 = 255;

    #[inline]
    pub fn value(self) -> u8 {
        match self {
            PixelClass::Background => Self::BACKGROUND_VALUE,
            PixelClass::Shadow => Self::SHADOW_VALUE,
            PixelClass::Foreground => Self::FOREGROUND_VALUE,
        }
    }

    /// Inverse of [`PixelClass::value`]. Values other than the shadow and
    /// foreground markers read as background.
    #[inline]
    pub fn from_value(value: u8) -> Self {
        match value {
            Self::FOREGROUND_VALUE => PixelClass::Foreground,
            Self::SHADOW_VALUE => PixelClass::Shadow,
            _ => PixelClass::Background,
        }
    }
}

/// Per-pixel output of the segmenter, encoded as 0 / 127 / 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundMask {
    values: Array2<u8>,
}

impl ForegroundMask {
    pub fn from_values(values: Array2<u8>) -> Self {
        Self { values }
    }

    /// Mask with `true` cells marked foreground and everything else background.
    pub fn from_foreground(foreground: &Array2<bool>) -> Self {
        Self {
            values: foreground.mapv(|fg| {
                if fg {
                    PixelClass::FOREGROUND_VALUE
                } else {
                    PixelClass::BACKGROUND_VALUE
                }
            }),
        }
    }

    pub fn values(&self) -> ArrayView2<'_, u8> {
        self.values.view()
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn class_at(&self, row: usize, col: usize) -> PixelClass {
        PixelClass::from_value(self.values[[row, col]])
    }

    /// Binary view of true foreground; shadows are excluded.
    pub fn foreground(&self) -> Array2<bool> {
        self.values.mapv(|v| v == PixelClass::FOREGROUND_VALUE)
    }

    /// Foreground as a 0 / 255 image, shadows cleared.
    pub fn foreground_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            let fg = self.values[[y as usize, x as usize]] == PixelClass::FOREGROUND_VALUE;
            Luma([if fg { PixelClass::FOREGROUND_VALUE } else { PixelClass::BACKGROUND_VALUE }])
        })
    }

    pub fn count(&self, class: PixelClass) -> usize {
        self.values
            .iter()
            .filter(|&&v| PixelClass::from_value(v) == class)
            .count()
    }
}
