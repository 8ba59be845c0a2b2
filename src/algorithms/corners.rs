use crate::config::StackConfig;
use crate::data::{CornerFeatures, FeaturePoint, Pixel, StackImage};

/// Inner inset applied to every grid cell before scanning, keeping the
/// brightness window away from cell borders.
const CELL_PADDING: i32 = 5;

/// Detects one feature point per grid cell in each of the four corner
/// regions of `image`. The caller runs this once on the reference image;
/// candidates get their points from patch matching instead.
pub fn find_corner_points(image: &StackImage, config: &StackConfig) -> CornerFeatures {
    let count = config.grid_size() as i32;
    let padding = config.search_radius(image.width(), image.height());

    let x = (image.width() as f32 * config.corner_area_fraction) as i32;
    let y = (image.height() as f32 * config.corner_area_fraction) as i32;
    let sx = image.width() as i32;
    let sy = image.height() as i32;

    CornerFeatures {
        top_left: find_region_points(image, 0, x, 0, y, count, padding, config),
        top_right: find_region_points(image, sx - x, sx, 0, y, count, padding, config),
        bottom_left: find_region_points(image, 0, x, sy - y, sy, count, padding, config),
        bottom_right: find_region_points(image, sx - x, sx, sy - y, sy, count, padding, config),
    }
}

/// Splits one corner region into a `count x count` grid and finds the
/// brightest spot of every cell.
#[allow(clippy::too_many_arguments)]
fn find_region_points(
    image: &StackImage,
    xmin: i32,
    xmax: i32,
    ymin: i32,
    ymax: i32,
    count: i32,
    padding: i32,
    config: &StackConfig,
) -> Vec<FeaturePoint> {
    let xmin = xmin + padding;
    let ymin = ymin + padding;
    let xmax = xmax - padding;
    let ymax = ymax - padding;

    let size_x = (xmax - xmin) / count;
    let size_y = (ymax - ymin) / count;

    let mut points = Vec::with_capacity((count * count) as usize);
    for i in 0..count {
        for j in 0..count {
            let x = size_x * i + xmin;
            let y = size_y * j + ymin;
            points.push(find_cell_point(image, x, x + size_x, y, y + size_y, config));
        }
    }
    points
}

/// Scans a single cell for the pixel with the highest radius-averaged
/// brightness. Ties keep the first maximum in scan order. A degenerate
/// cell yields the zeroed placeholder point.
fn find_cell_point(
    image: &StackImage,
    xmin: i32,
    xmax: i32,
    ymin: i32,
    ymax: i32,
    config: &StackConfig,
) -> FeaturePoint {
    let xmin = xmin + CELL_PADDING;
    let ymin = ymin + CELL_PADDING;
    let xmax = xmax - CELL_PADDING;
    let ymax = ymax - CELL_PADDING;

    let mut max_brightness = 0u8;
    let mut best = FeaturePoint::zeroed();

    for i in xmin..=xmax {
        for j in ymin..=ymax {
            if let Some(avg) = average_in_radius(image, i, j, config.patch_radius) {
                let brightness = avg.brightness();
                if brightness > max_brightness {
                    max_brightness = brightness;
                    best = FeaturePoint::new(i, j, image.get_pixel(i, j), 0.0);
                }
            }
        }
    }
    best
}

/// Mean color over a `(2*radius+1)` square window, skipping cells outside
/// the image. `None` when the whole window is out of bounds.
pub fn average_in_radius(image: &StackImage, x: i32, y: i32, radius: i32) -> Option<Pixel> {
    let mut count = 0u32;
    let mut rsum = 0u32;
    let mut gsum = 0u32;
    let mut bsum = 0u32;

    for i in -radius..=radius {
        for j in -radius..=radius {
            if let Some(pixel) = image.get_pixel(x + i, y + j) {
                rsum += pixel.r as u32;
                gsum += pixel.g as u32;
                bsum += pixel.b as u32;
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    Some(Pixel::new(
        (rsum as f32 / count as f32).clamp(0.0, 255.0) as u8,
        (gsum as f32 / count as f32).clamp(0.0, 255.0) as u8,
        (bsum as f32 / count as f32).clamp(0.0, 255.0) as u8,
    ))
}
