//! Connected foreground components of a mask.

use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ConfigError;
use crate::segmentation::mask::ForegroundMask;
use crate::tracker::RawRegion;

/// Footprint of the opening applied before labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelShape {
    /// Diamond; radius 1 is the 3×3 cross
    #[default]
    Cross,
    /// Full `(2r + 1) × (2r + 1)` square
    Rect,
}

impl KernelShape {
    fn norm(self) -> Norm {
        match self {
            KernelShape::Cross => Norm::L1,
            KernelShape::Rect => Norm::LInf,
        }
    }
}

/// Configuration for the RegionExtractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub kernel_shape: KernelShape,
    /// Kernel radius; 1 gives a 3×3 footprint.
    pub kernel_radius: usize,
    /// Opening iterations. Zero disables noise suppression.
    pub iterations: usize,
    /// Components with fewer pixels than this are discarded.
    pub min_area: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kernel_shape: KernelShape::Cross,
            kernel_radius: 1,
            iterations: 2,
            min_area: 0,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kernel_radius == 0 {
            return Err(ConfigError::KernelRadius);
        }
        self.opening_distance().map(|_| ())
    }

    /// Repeated openings with a radius-`r` footprint equal one opening at
    /// distance `r × iterations`.
    fn opening_distance(&self) -> Result<u8, ConfigError> {
        self.kernel_radius
            .checked_mul(self.iterations)
            .and_then(|k| u8::try_from(k).ok())
            .filter(|&k| k < u8::MAX)
            .ok_or(ConfigError::KernelRadius)
    }
}

/// Turns foreground masks into candidate regions.
#[derive(Debug, Clone)]
pub struct RegionExtractor {
    config: ExtractorConfig,
    distance: u8,
}

impl RegionExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let distance = config.opening_distance()?;
        Ok(Self { config, distance })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Open the foreground of `mask` and return the bounding rectangle of each
    /// 8-connected component with at least `min_area` pixels.
    ///
    /// Shadow pixels never contribute. The order of the result carries no meaning.
    pub fn extract(&self, mask: &ForegroundMask) -> Vec<RawRegion> {
        let foreground = mask.foreground_image();
        let opened = if self.distance == 0 {
            foreground
        } else {
            let norm = self.config.kernel_shape.norm();
            imageproc::morphology::open(&foreground, norm, self.distance)
        };

        let regions: Vec<RawRegion> = components(&opened)
            .into_iter()
            .filter(|&(_, area)| area >= self.config.min_area)
            .map(|(region, _)| region)
            .collect();
        trace!(regions = regions.len(), "extracted regions");
        regions
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        let config = ExtractorConfig::default();
        let distance = (config.kernel_radius * config.iterations) as u8;
        Self { config, distance }
    }
}

/// Label 8-connected non-zero pixels, returning each component's enclosing
/// rectangle and pixel count in label order.
pub(crate) fn components(img: &GrayImage) -> Vec<(RawRegion, usize)> {
    let labels = connected_components(img, Connectivity::Eight, Luma([0u8]));

    // label -> (min_x, min_y, max_x, max_y, area)
    let mut extents: BTreeMap<u32, (u32, u32, u32, u32, usize)> = BTreeMap::new();
    for (x, y, &Luma([label])) in labels.enumerate_pixels() {
        if label == 0 {
            continue;
        }
        extents
            .entry(label)
            .and_modify(|e| {
                e.0 = e.0.min(x);
                e.1 = e.1.min(y);
                e.2 = e.2.max(x);
                e.3 = e.3.max(y);
                e.4 += 1;
            })
            .or_insert((x, y, x, y, 1));
    }

    extents
        .into_values()
        .map(|(x1, y1, x2, y2, area)| (RawRegion::from_corners(x1, y1, x2 + 1, y2 + 1), area))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::PixelClass;
    use ndarray::{Array2, s};

    fn mask_with(squares: &[(usize, usize, usize)]) -> ForegroundMask {
        let mut fg = Array2::from_elem((40, 60), false);
        for &(x, y, size) in squares {
            fg.slice_mut(s![y..y + size, x..x + size]).fill(true);
        }
        ForegroundMask::from_foreground(&fg)
    }

    fn sorted(mut regions: Vec<RawRegion>) -> Vec<RawRegion> {
        regions.sort_by_key(|r| (r.x, r.y));
        regions
    }

    #[test]
    fn test_empty_mask_yields_nothing() {
        let extractor = RegionExtractor::default();
        assert!(extractor.extract(&mask_with(&[])).is_empty());
    }

    #[test]
    fn test_regions_found() {
        let extractor = RegionExtractor::default();
        let regions = extractor.extract(&mask_with(&[(5, 5, 8), (30, 20, 10)]));
        assert_eq!(
            sorted(regions),
            vec![RawRegion::new(5, 5, 8, 8), RawRegion::new(30, 20, 10, 10)]
        );
    }

    #[test]
    fn test_noise_suppressed() {
        let extractor = RegionExtractor::default();
        assert!(extractor.extract(&mask_with(&[(5, 5, 2), (20, 20, 3)])).is_empty());
    }

    #[test]
    fn test_min_area() {
        let extractor = RegionExtractor::new(ExtractorConfig {
            min_area: 50,
            ..Default::default()
        })
        .unwrap();
        let regions = extractor.extract(&mask_with(&[(5, 5, 6), (30, 20, 10)]));
        assert_eq!(regions, vec![RawRegion::new(30, 20, 10, 10)]);
    }

    #[test]
    fn test_rect_kernel_keeps_square_corners() {
        // A square opened by a square footprint is unchanged, so all 64 pixels survive.
        let extractor = RegionExtractor::new(ExtractorConfig {
            kernel_shape: KernelShape::Rect,
            min_area: 64,
            ..Default::default()
        })
        .unwrap();
        let regions = extractor.extract(&mask_with(&[(5, 5, 8)]));
        assert_eq!(regions, vec![RawRegion::new(5, 5, 8, 8)]);

        let cross = RegionExtractor::new(ExtractorConfig {
            min_area: 64,
            ..Default::default()
        })
        .unwrap();
        assert!(cross.extract(&mask_with(&[(5, 5, 8)])).is_empty());
    }

    #[test]
    fn test_shadow_pixels_ignored() {
        let mut values = Array2::from_elem((40, 60), PixelClass::BACKGROUND_VALUE);
        values
            .slice_mut(s![5..15, 5..15])
            .fill(PixelClass::SHADOW_VALUE);
        values
            .slice_mut(s![20..30, 30..40])
            .fill(PixelClass::FOREGROUND_VALUE);
        let mask = ForegroundMask::from_values(values);

        let regions = RegionExtractor::default().extract(&mask);
        assert_eq!(regions, vec![RawRegion::new(30, 20, 10, 10)]);
    }

    #[test]
    fn test_shadow_only_mask_yields_nothing() {
        let values = Array2::from_elem((40, 60), PixelClass::SHADOW_VALUE);
        let mask = ForegroundMask::from_values(values);
        assert!(RegionExtractor::default().extract(&mask).is_empty());
    }

    #[test]
    fn test_blob_inside_ring_is_reported() {
        let mut fg = Array2::from_elem((40, 60), false);
        fg.slice_mut(s![5..31, 5..31]).fill(true);
        fg.slice_mut(s![11..25, 11..25]).fill(false);
        fg.slice_mut(s![15..21, 15..21]).fill(true);

        let regions = RegionExtractor::default().extract(&ForegroundMask::from_foreground(&fg));
        assert_eq!(
            sorted(regions),
            vec![RawRegion::new(5, 5, 26, 26), RawRegion::new(15, 15, 6, 6)]
        );
    }

    #[test]
    fn test_diagonal_cells_connect() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(1, 1, Luma([255]));
        img.put_pixel(3, 3, Luma([255]));
        assert_eq!(
            components(&img),
            vec![(RawRegion::new(0, 0, 2, 2), 2), (RawRegion::new(3, 3, 1, 1), 1)]
        );
    }

    #[test]
    fn test_no_opening() {
        let extractor = RegionExtractor::new(ExtractorConfig {
            iterations: 0,
            ..Default::default()
        })
        .unwrap();
        let regions = extractor.extract(&mask_with(&[(5, 5, 1)]));
        assert_eq!(regions, vec![RawRegion::new(5, 5, 1, 1)]);
    }

    #[test]
    fn test_oversized_opening_rejected() {
        let config = ExtractorConfig {
            kernel_radius: 200,
            iterations: 2,
            ..Default::default()
        };
        assert_eq!(RegionExtractor::new(config).unwrap_err(), ConfigError::KernelRadius);
    }
}
