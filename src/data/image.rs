use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul};

/// A single RGB color sample. Channel arithmetic is deterministic:
/// addition saturates, scalar multiplication truncates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Arithmetic mean of the three channels.
    pub fn brightness(&self) -> u8 {
        ((self.r as u32 + self.g as u32 + self.b as u32) / 3) as u8
    }

    /// Perceptual brightness, used only to order pixels for the median.
    pub fn luma(&self) -> f32 {
        0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32
    }
}

impl PartialEq for Pixel {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}
impl Eq for Pixel {}

impl Add for Pixel {
    type Output = Pixel;

    fn add(self, other: Pixel) -> Pixel {
        Pixel::new(
            self.r.saturating_add(other.r),
            self.g.saturating_add(other.g),
            self.b.saturating_add(other.b),
        )
    }
}

impl Mul<f32> for Pixel {
    type Output = Pixel;

    fn mul(self, factor: f32) -> Pixel {
        Pixel::new(
            (self.r as f32 * factor) as u8,
            (self.g as f32 * factor) as u8,
            (self.b as f32 * factor) as u8,
        )
    }
}

/// A feature location in image coordinates. The owning pixel carries the
/// raw color at the location; `delta` is the match confidence score
/// (lower is better, 0.0 for detected reference points).
///
/// Equality and hashing consider only the coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub x: i32,
    pub y: i32,
    pub pixel: Option<Pixel>,
    pub delta: f32,
}

impl FeaturePoint {
    pub fn new(x: i32, y: i32, pixel: Option<Pixel>, delta: f32) -> Self {
        Self { x, y, pixel, delta }
    }

    /// Placeholder for a cell that produced no usable feature.
    pub fn zeroed() -> Self {
        Self::new(0, 0, None, 0.0)
    }
}

impl PartialEq for FeaturePoint {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}
impl Eq for FeaturePoint {}

impl Hash for FeaturePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

/// One of the four corner search regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Quadrant::TopLeft => "top-left",
            Quadrant::TopRight => "top-right",
            Quadrant::BottomLeft => "bottom-left",
            Quadrant::BottomRight => "bottom-right",
        };
        write!(f, "{}", name)
    }
}

/// Corner features detected on the reference image, one vector of
/// `sample_count` points per quadrant. Slot position is the stable index
/// used to pair reference points with their matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CornerFeatures {
    pub top_left: Vec<FeaturePoint>,
    pub top_right: Vec<FeaturePoint>,
    pub bottom_left: Vec<FeaturePoint>,
    pub bottom_right: Vec<FeaturePoint>,
}

impl CornerFeatures {
    pub fn quadrant(&self, quadrant: Quadrant) -> &[FeaturePoint] {
        match quadrant {
            Quadrant::TopLeft => &self.top_left,
            Quadrant::TopRight => &self.top_right,
            Quadrant::BottomLeft => &self.bottom_left,
            Quadrant::BottomRight => &self.bottom_right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top_left.is_empty()
            || self.top_right.is_empty()
            || self.bottom_left.is_empty()
            || self.bottom_right.is_empty()
    }
}

/// Matched feature locations in a candidate image, slot-aligned with the
/// reference's `CornerFeatures`. `None` marks slots where no match was
/// found within tolerance.
#[derive(Debug, Clone)]
pub struct MatchedFeatures {
    pub top_left: Vec<Option<FeaturePoint>>,
    pub top_right: Vec<Option<FeaturePoint>>,
    pub bottom_left: Vec<Option<FeaturePoint>>,
    pub bottom_right: Vec<Option<FeaturePoint>>,
}

impl MatchedFeatures {
    pub fn quadrant(&self, quadrant: Quadrant) -> &[Option<FeaturePoint>] {
        match quadrant {
            Quadrant::TopLeft => &self.top_left,
            Quadrant::TopRight => &self.top_right,
            Quadrant::BottomLeft => &self.bottom_left,
            Quadrant::BottomRight => &self.bottom_right,
        }
    }
}

/// In-memory pixel grid with bounds-checked access. Cells hold
/// `Option<Pixel>` because warped images have gaps where the source
/// lookup fell outside the candidate's bounds.
#[derive(Debug, Clone)]
pub struct StackImage {
    width: u32,
    height: u32,
    pixels: Vec<Option<Pixel>>,
    pub id: u32,
    pub filename: String,
}

impl StackImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; (width * height) as usize],
            id: 0,
            filename: String::new(),
        }
    }

    /// Builds an image by evaluating `f` at every coordinate.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Pixel,
    {
        let mut image = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                image.pixels[(y * width + x) as usize] = Some(f(x, y));
            }
        }
        image
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel at (x, y), or `None` when the coordinate is out
    /// of bounds or the cell was never set.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.pixels[(y as u32 * self.width + x as u32) as usize]
        } else {
            None
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Option<Pixel>) {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[(y * self.width + x) as usize] = pixel;
    }

    /// Replaces an entire row. Used by the parallel warp and stack loops,
    /// which build rows independently.
    pub fn set_row(&mut self, y: u32, row: Vec<Option<Pixel>>) {
        debug_assert_eq!(row.len(), self.width as usize);
        let start = (y * self.width) as usize;
        self.pixels[start..start + self.width as usize].copy_from_slice(&row);
    }
}
