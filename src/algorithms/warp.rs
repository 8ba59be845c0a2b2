use crate::algorithms::homography::Homography;
use crate::data::{Pixel, StackImage};
use rayon::prelude::*;

/// Fractional coordinates this close to an integer are snapped, so
/// near-exact transforms (identity, pure integer shifts) resample
/// pixel-exact despite solver rounding noise.
const SNAP_EPSILON: f64 = 1e-4;

/// Resamples `candidate` into an output grid of the given size by
/// projecting every output coordinate through the forward transform and
/// bilinearly interpolating the four neighboring candidate pixels.
/// Output cells whose lookups fall outside the candidate stay unset.
pub fn warp(
    candidate: &StackImage,
    homography: &Homography,
    width: u32,
    height: u32,
) -> StackImage {
    let rows: Vec<Vec<Option<Pixel>>> = (0..height)
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| sample(candidate, homography, x, y))
                .collect()
        })
        .collect();

    let mut result = StackImage::new(width, height);
    result.id = candidate.id;
    result.filename = candidate.filename.clone();
    for (y, row) in rows.into_iter().enumerate() {
        result.set_row(y as u32, row);
    }
    result
}

fn sample(candidate: &StackImage, homography: &Homography, x: u32, y: u32) -> Option<Pixel> {
    let (px, py) = homography.project(x as f64, y as f64);
    if !px.is_finite() || !py.is_finite() {
        return None;
    }

    let (x_trunc, x_lerp) = split_coordinate(px);
    let (y_trunc, y_lerp) = split_coordinate(py);

    interp_pixel(candidate, x_trunc, y_trunc, x_lerp, y_lerp)
}

/// Floor plus fractional remainder, with an epsilon snap to the nearest
/// integer.
fn split_coordinate(value: f64) -> (i32, f32) {
    let rounded = value.round();
    if (value - rounded).abs() < SNAP_EPSILON {
        return (rounded as i32, 0.0);
    }
    let floor = value.floor();
    (floor as i32, (value - floor) as f32)
}

/// Bilinear interpolation: horizontally at both rows, then vertically.
/// A neighbor with weight zero is never looked up; a missing neighbor
/// with nonzero weight makes the sample undefined.
fn interp_pixel(
    image: &StackImage,
    x_trunc: i32,
    y_trunc: i32,
    x_lerp: f32,
    y_lerp: f32,
) -> Option<Pixel> {
    let row = |yr: i32| -> Option<Pixel> {
        lerp(
            image.get_pixel(x_trunc, yr),
            image.get_pixel(x_trunc + 1, yr),
            x_lerp,
        )
    };

    if y_lerp == 0.0 {
        return row(y_trunc);
    }
    lerp(row(y_trunc), row(y_trunc + 1), y_lerp)
}

fn lerp(a: Option<Pixel>, b: Option<Pixel>, t: f32) -> Option<Pixel> {
    if t == 0.0 {
        return a;
    }
    if t == 1.0 {
        return b;
    }
    Some(a? * (1.0 - t) + b? * t)
}
