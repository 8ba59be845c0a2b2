use crate::data::{Pixel, StackImage};
use crate::error::StackError;
use instant::Instant;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pixel reducer applied at every coordinate of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    Mean,
    Median,
}

impl std::str::FromStr for StackMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(StackMode::Mean),
            "median" => Ok(StackMode::Median),
            other => Err(anyhow::anyhow!("unknown stacking mode: {}", other)),
        }
    }
}

/// Folds all input images into one composite, reducing each coordinate's
/// defined pixels with `mode`. Output size comes from the first image;
/// coordinates with zero contributors stay unset (the writer substitutes
/// the sentinel color).
pub fn stack(images: &[&StackImage], mode: StackMode) -> Result<StackImage, StackError> {
    let first = images.first().ok_or(StackError::EmptyBatch)?;
    let (width, height) = (first.width(), first.height());

    log::info!("Stacking {} images ({:?})...", images.len(), mode);
    let start = Instant::now();

    let rows: Vec<Vec<Option<Pixel>>> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut gathered = Vec::with_capacity(images.len());
            (0..width)
                .map(|x| {
                    gathered.clear();
                    gathered.extend(
                        images
                            .iter()
                            .filter_map(|img| img.get_pixel(x as i32, y as i32)),
                    );
                    aggregate(&mut gathered, mode)
                })
                .collect()
        })
        .collect();

    let mut result = StackImage::new(width, height);
    for (y, row) in rows.into_iter().enumerate() {
        result.set_row(y as u32, row);
    }

    log::info!("Images stacked in {} ms", start.elapsed().as_millis());
    Ok(result)
}

/// Reduces one coordinate's gathered pixels. Median orders by luma;
/// an odd count picks the middle element, an even count averages the
/// two middle elements channel-wise.
fn aggregate(pixels: &mut [Pixel], mode: StackMode) -> Option<Pixel> {
    if pixels.is_empty() {
        return None;
    }
    match mode {
        StackMode::Mean => Some(pixel_average(pixels)),
        StackMode::Median => {
            pixels.sort_by(|a, b| a.luma().total_cmp(&b.luma()));
            let mid = pixels.len() / 2;
            if pixels.len() % 2 == 0 {
                Some(pixel_average(&pixels[mid - 1..=mid]))
            } else {
                Some(pixels[mid])
            }
        }
    }
}

/// Channel-wise arithmetic mean, truncating to 8 bits.
fn pixel_average(pixels: &[Pixel]) -> Pixel {
    let mut rsum = 0u32;
    let mut gsum = 0u32;
    let mut bsum = 0u32;
    for p in pixels {
        rsum += p.r as u32;
        gsum += p.g as u32;
        bsum += p.b as u32;
    }
    let n = pixels.len() as f32;
    Pixel::new(
        (rsum as f32 / n) as u8,
        (gsum as f32 / n) as u8,
        (bsum as f32 / n) as u8,
    )
}
