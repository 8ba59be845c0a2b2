use crate::algorithms::stacking::StackMode;
use crate::error::StackError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for the alignment and stacking pipeline.
///
/// Loadable from TOML or JSON (autodetected). Every field has a default
/// matching the stock pipeline behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Fraction of image width/height each corner search region spans
    /// from its nearest edge.
    pub corner_area_fraction: f32,
    /// Half-size of the square pixel patch used for brightness averaging
    /// and patch matching.
    pub patch_radius: i32,
    /// Fraction of the mean image dimension used as the match search
    /// radius and the corner-region inset.
    pub search_radius_fraction: f32,
    /// Feature samples per corner quadrant. Must be a perfect square.
    pub sample_count: usize,
    /// Matches with an area delta above this are discarded.
    pub delta_threshold: f32,
    /// Worst allowed reprojection error (pixels) across all matched
    /// points before an estimated transform is rejected.
    pub max_reprojection_error: f64,
    /// Number of parallel alignment workers.
    pub workers: usize,
    /// Pixel reducer used when stacking.
    pub mode: StackMode,
    /// Stack candidates that failed alignment unwarped. Off by default:
    /// unaligned frames bias the composite toward misaligned data.
    pub include_rejected: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            corner_area_fraction: 0.4,
            patch_radius: 4,
            search_radius_fraction: 0.03,
            sample_count: 9,
            delta_threshold: 1.0,
            max_reprojection_error: 3.0,
            workers: 4,
            mode: StackMode::Mean,
            include_rejected: false,
        }
    }
}

impl StackConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path)?;

        let config: Self = if content.trim_start().starts_with('{') {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StackError> {
        let count = (self.sample_count as f64).sqrt() as usize;
        if count * count != self.sample_count || self.sample_count == 0 {
            return Err(StackError::InvalidSampleCount(self.sample_count));
        }
        Ok(())
    }

    /// Grid dimension per corner region: sqrt of the sample count.
    pub fn grid_size(&self) -> usize {
        (self.sample_count as f64).sqrt() as usize
    }

    /// Search radius in pixels for a given image size, also used as the
    /// corner-region inset.
    pub fn search_radius(&self, width: u32, height: u32) -> i32 {
        ((width + height) as f32 / 2.0 * self.search_radius_fraction).round() as i32
    }
}
