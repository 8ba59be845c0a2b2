use crate::config::StackConfig;
use crate::data::{CornerFeatures, FeaturePoint, MatchedFeatures, Quadrant, StackImage};
use ndarray::Array3;

/// Copies the `(2*radius+1)` square patch centered at (x, y) into `area`.
/// Cells outside the image stay zero, matching the behavior of treating
/// out-of-bounds pixels as absent.
fn extract_area(image: &StackImage, x: i32, y: i32, radius: i32, area: &mut Array3<i32>) {
    area.fill(0);
    let size = (radius * 2 + 1) as usize;
    for i in 0..size {
        for j in 0..size {
            let xi = x + i as i32 - radius;
            let yj = y + j as i32 - radius;
            if let Some(p) = image.get_pixel(xi, yj) {
                area[[i, j, 0]] = p.r as i32;
                area[[i, j, 1]] = p.g as i32;
                area[[i, j, 2]] = p.b as i32;
            }
        }
    }
}

fn new_area(radius: i32) -> Array3<i32> {
    let size = (radius * 2 + 1) as usize;
    Array3::zeros((size, size, 3))
}

/// Aggregate color difference between two equally sized patches: the
/// per-cell channel differences averaged over the patch, divided by 3,
/// absolute value. Lower is better; 0 means identical patches.
fn area_delta(a: &Array3<i32>, b: &Array3<i32>) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0u32;
    let (rows, cols, _) = a.dim();
    for i in 0..rows {
        for j in 0..cols {
            let rd = a[[i, j, 0]] - b[[i, j, 0]];
            let gd = a[[i, j, 1]] - b[[i, j, 1]];
            let bd = a[[i, j, 2]] - b[[i, j, 2]];
            sum += (rd + gd + bd) as f32 / 3.0;
            count += 1;
        }
    }
    (sum / count as f32).abs()
}

/// Exhaustively searches every offset within `radius` of (x, y) in
/// `candidate` for the patch closest to the reference patch at (x, y).
///
/// Returns `None` when even the best delta exceeds the rejection
/// threshold, which signals a featureless or unreliable region.
pub fn find_near_point(
    reference: &StackImage,
    candidate: &StackImage,
    x: i32,
    y: i32,
    radius: i32,
    config: &StackConfig,
) -> Option<FeaturePoint> {
    let mut target = new_area(config.patch_radius);
    extract_area(reference, x, y, config.patch_radius, &mut target);

    let mut smallest_delta = f32::MAX;
    let mut closest_x = 0;
    let mut closest_y = 0;

    // Scratch buffer reused across all offsets.
    let mut area = new_area(config.patch_radius);

    for i in -radius..=radius {
        for j in -radius..=radius {
            let xi = x + i;
            let yj = y + j;

            extract_area(candidate, xi, yj, config.patch_radius, &mut area);
            let delta = area_delta(&target, &area);

            if delta < smallest_delta {
                smallest_delta = delta;
                closest_x = xi;
                closest_y = yj;
            }
        }
    }

    if smallest_delta > config.delta_threshold {
        log::debug!(
            "match at ({}, {}) rejected, best delta {:.3}",
            x,
            y,
            smallest_delta
        );
        return None;
    }
    log::trace!(
        "match at ({}, {}) -> ({}, {}), delta {:.3}",
        x,
        y,
        closest_x,
        closest_y,
        smallest_delta
    );

    Some(FeaturePoint::new(
        closest_x,
        closest_y,
        candidate.get_pixel(closest_x, closest_y),
        smallest_delta,
    ))
}

/// Matches every reference feature point against `candidate`, producing
/// slot-aligned matched collections (None where no match within tolerance).
pub fn match_features(
    reference: &StackImage,
    features: &CornerFeatures,
    candidate: &StackImage,
    config: &StackConfig,
) -> MatchedFeatures {
    let radius = config.search_radius(candidate.width(), candidate.height());

    let match_quadrant = |source: &[FeaturePoint]| -> Vec<Option<FeaturePoint>> {
        source
            .iter()
            .map(|fix| find_near_point(reference, candidate, fix.x, fix.y, radius, config))
            .collect()
    };

    MatchedFeatures {
        top_left: match_quadrant(features.quadrant(Quadrant::TopLeft)),
        top_right: match_quadrant(features.quadrant(Quadrant::TopRight)),
        bottom_left: match_quadrant(features.quadrant(Quadrant::BottomLeft)),
        bottom_right: match_quadrant(features.quadrant(Quadrant::BottomRight)),
    }
}
