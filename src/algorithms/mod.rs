pub mod corners;
pub mod estimator;
pub mod homography;
pub mod matching;
pub mod stacking;
pub mod warp;

pub use corners::*;
pub use estimator::*;
pub use homography::*;
pub use matching::*;
pub use stacking::*;
pub use warp::*;
