//! Per-frame motion segmentation: background model, foreground regions and box scaling.

mod background;
mod frame;
mod mask;
mod regions;
mod scaler;

pub use background::{BackgroundSubtractor, SegmenterConfig};
pub use frame::Frame;
pub use mask::{ForegroundMask, PixelClass};
pub use regions::{ExtractorConfig, KernelShape, RegionExtractor};
pub use scaler::BoxScaler;
