//! Adaptive Gaussian-mixture background model.
//!
//! Every pixel keeps up to `max_modes` Gaussians over its luminance, ordered
//! by weight. The leading modes whose cumulative weight stays below
//! `background_ratio` describe the background; a pixel within
//! `variance_threshold` squared Mahalanobis distance of one of them is
//! background. Each call updates the first mode within
//! `variance_threshold_gen` of the pixel, or spawns a new mode in place of
//! the weakest one.

use ndarray::{Array2, Array3, ArrayViewMut1, s};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::segmentation::frame::Frame;
use crate::segmentation::mask::{ForegroundMask, PixelClass};

/// Configuration for the BackgroundSubtractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Number of frames the automatic learning rate averages over.
    pub history: u32,
    /// Squared Mahalanobis distance under which a pixel matches a background mode.
    pub variance_threshold: f32,
    pub detect_shadows: bool,
    pub max_modes: usize,
    pub background_ratio: f32,
    /// Squared Mahalanobis distance under which a pixel updates an existing mode.
    pub variance_threshold_gen: f32,
    pub variance_init: f32,
    pub variance_min: f32,
    pub variance_max: f32,
    pub complexity_reduction: f32,
    /// Lowest luminance ratio against the background still read as shadow.
    pub shadow_threshold: f32,
    /// Fixed learning rate; `None` uses `1 / min(2 * frames, history)`.
    pub learning_rate: Option<f32>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            history: 500,
            variance_threshold: 25.0,
            detect_shadows: true,
            max_modes: 5,
            background_ratio: 0.9,
            variance_threshold_gen: 9.0,
            variance_init: 15.0,
            variance_min: 4.0,
            variance_max: 75.0,
            complexity_reduction: 0.05,
            shadow_threshold: 0.5,
            learning_rate: None,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history == 0 {
            return Err(ConfigError::History);
        }
        if !(self.variance_threshold > 0.0) {
            return Err(ConfigError::VarianceThreshold(self.variance_threshold));
        }
        if !(self.variance_threshold_gen > 0.0) {
            return Err(ConfigError::VarianceThreshold(self.variance_threshold_gen));
        }
        if self.max_modes == 0 || self.max_modes > u8::MAX as usize {
            return Err(ConfigError::MaxModes);
        }
        if !(self.shadow_threshold > 0.0 && self.shadow_threshold < 1.0) {
            return Err(ConfigError::ShadowThreshold(self.shadow_threshold));
        }
        if let Some(rate) = self.learning_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::LearningRate(rate));
            }
        }
        if !(self.variance_min > 0.0
            && self.variance_min <= self.variance_init
            && self.variance_init <= self.variance_max)
        {
            return Err(ConfigError::VarianceBounds {
                min: self.variance_min,
                init: self.variance_init,
                max: self.variance_max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Gaussian {
    weight: f32,
    mean: f32,
    variance: f32,
}

/// Stateful foreground segmenter. One instance per stream.
#[derive(Debug, Clone)]
pub struct BackgroundSubtractor {
    config: SegmenterConfig,
    /// `(height, width, max_modes)`, each pixel's modes sorted by descending weight
    mixtures: Array3<Gaussian>,
    /// Number of live modes per pixel
    modes: Array2<u8>,
    frames_seen: u64,
}

impl BackgroundSubtractor {
    pub fn new(config: SegmenterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: SegmenterConfig) -> Self {
        Self {
            config,
            mixtures: Array3::default((0, 0, 0)),
            modes: Array2::zeros((0, 0)),
            frames_seen: 0,
        }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Frames absorbed since the model was last reset.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Whether the model has seen at least `history` frames.
    pub fn is_seeded(&self) -> bool {
        self.frames_seen >= self.config.history as u64
    }

    /// `(height, width)` the model is built for, if any.
    pub fn dim(&self) -> Option<(usize, usize)> {
        if self.frames_seen == 0 {
            None
        } else {
            Some(self.modes.dim())
        }
    }

    /// Drop all learned state.
    pub fn reset(&mut self) {
        self.mixtures = Array3::default((0, 0, 0));
        self.modes = Array2::zeros((0, 0));
        self.frames_seen = 0;
    }

    fn learning_rate(&self) -> f32 {
        match self.config.learning_rate {
            Some(rate) if self.frames_seen > 1 => rate,
            _ => 1.0 / (2 * self.frames_seen).min(self.config.history as u64) as f32,
        }
    }

    /// Classify every pixel of `frame` and fold it into the model.
    ///
    /// A frame whose size differs from the model's restarts the model from
    /// that frame.
    pub fn apply(&mut self, frame: &Frame) -> ForegroundMask {
        let dim = frame.dim();
        if self.dim() != Some(dim) {
            if let Some((height, width)) = self.dim() {
                debug!(
                    old_width = width,
                    old_height = height,
                    new_width = dim.1,
                    new_height = dim.0,
                    "frame size changed, resetting background model"
                );
            }
            self.mixtures = Array3::default((dim.0, dim.1, self.config.max_modes));
            self.modes = Array2::zeros(dim);
            self.frames_seen = 0;
        }

        self.frames_seen += 1;
        let alpha = self.learning_rate();

        let mut values = Array2::zeros(dim);
        for ((row, col), &pix) in frame.pixels().indexed_iter() {
            let mut mixture = self.mixtures.slice_mut(s![row, col, ..]);
            let nmodes = &mut self.modes[[row, col]];
            let class = update_pixel(&mut mixture, nmodes, pix as f32, alpha, &self.config);
            values[[row, col]] = class.value();
        }

        ForegroundMask::from_values(values)
    }
}

impl Default for BackgroundSubtractor {
    fn default() -> Self {
        Self::with_valid_config(SegmenterConfig::default())
    }
}

fn update_pixel(
    mixture: &mut ArrayViewMut1<'_, Gaussian>,
    nmodes: &mut u8,
    pix: f32,
    alpha: f32,
    config: &SegmenterConfig,
) -> PixelClass {
    let alpha1 = 1.0 - alpha;
    let prune = -alpha * config.complexity_reduction;
    let mut n = *nmodes as usize;

    let mut background = false;
    let mut fits = false;
    let mut total_weight = 0.0;

    for m in 0..n {
        let mut g = mixture[m];
        g.weight = alpha1 * g.weight + prune;

        if !fits {
            let d = g.mean - pix;
            let dist2 = d * d;
            if total_weight < config.background_ratio
                && dist2 < config.variance_threshold * g.variance
            {
                background = true;
            }
            if dist2 < config.variance_threshold_gen * g.variance {
                fits = true;
                g.weight += alpha;
                let k = alpha / g.weight;
                g.mean -= k * d;
                g.variance = (g.variance + k * (dist2 - g.variance))
                    .clamp(config.variance_min, config.variance_max);
            }
        }

        total_weight += g.weight;
        mixture[m] = g;
    }

    // Starved modes drop out.
    let mut kept = 0;
    for m in 0..n {
        if mixture[m].weight >= -prune {
            mixture[kept] = mixture[m];
            kept += 1;
        }
    }
    n = kept;

    let total: f32 = (0..n).map(|m| mixture[m].weight).sum();
    if total > 0.0 {
        for m in 0..n {
            mixture[m].weight /= total;
        }
    }
    sort_modes(mixture, n);

    let shadow = !background && config.detect_shadows && is_shadow(mixture, n, pix, config);

    if !fits {
        let slot = if n == config.max_modes {
            n - 1
        } else {
            n += 1;
            n - 1
        };
        let weight = if n == 1 {
            1.0
        } else {
            for m in 0..slot {
                mixture[m].weight *= alpha1;
            }
            alpha
        };
        mixture[slot] = Gaussian {
            weight,
            mean: pix,
            variance: config.variance_init,
        };
        sort_modes(mixture, n);
    }

    *nmodes = n as u8;

    if background {
        PixelClass::Background
    } else if shadow {
        PixelClass::Shadow
    } else {
        PixelClass::Foreground
    }
}

/// Insertion sort of the first `n` modes by descending weight.
fn sort_modes(mixture: &mut ArrayViewMut1<'_, Gaussian>, n: usize) {
    for i in 1..n {
        let mut j = i;
        while j > 0 && mixture[j - 1].weight < mixture[j].weight {
            mixture.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// A pixel is a shadow when it is a uniformly darkened copy of one of the
/// background modes.
fn is_shadow(
    mixture: &ArrayViewMut1<'_, Gaussian>,
    n: usize,
    pix: f32,
    config: &SegmenterConfig,
) -> bool {
    let mut total_weight = 0.0;
    for m in 0..n {
        let g = mixture[m];
        let numerator = pix * g.mean;
        let denominator = g.mean * g.mean;
        if denominator == 0.0 {
            return false;
        }

        if numerator <= denominator && numerator >= config.shadow_threshold * denominator {
            let a = numerator / denominator;
            let d = a * g.mean - pix;
            if d * d < config.variance_threshold * g.variance * a * a {
                return true;
            }
        }

        total_weight += g.weight;
        if total_weight > config.background_ratio {
            return false;
        }
    }
    false
}
