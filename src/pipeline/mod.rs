pub mod pool;

pub use pool::*;

use crate::algorithms::{estimator, matching, warp};
use crate::config::StackConfig;
use crate::data::{CornerFeatures, StackImage};
use crate::error::StackError;
use instant::Instant;
use std::sync::Arc;

/// Terminal state of one candidate image. Both variants feed the finished
/// collection; whether rejected frames also reach the aggregator is a
/// configuration decision.
#[derive(Debug)]
pub enum AlignOutcome {
    /// The candidate was warped onto the reference grid.
    Aligned(StackImage),
    /// Alignment failed; the unmodified candidate is carried along.
    Rejected(StackImage),
}

impl AlignOutcome {
    pub fn image(&self) -> &StackImage {
        match self {
            AlignOutcome::Aligned(img) | AlignOutcome::Rejected(img) => img,
        }
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self, AlignOutcome::Aligned(_))
    }
}

/// Runs corner matching, transform estimation and resampling for one
/// (reference, candidate) pair. The reference and its detected corner
/// features are fixed at construction and shared read-only across workers.
pub struct AlignmentPipeline {
    reference: Arc<StackImage>,
    features: CornerFeatures,
    config: StackConfig,
}

impl AlignmentPipeline {
    /// Fails when the reference's corner features were never detected,
    /// which indicates a caller ordering bug.
    pub fn new(
        reference: Arc<StackImage>,
        features: CornerFeatures,
        config: StackConfig,
    ) -> Result<Self, StackError> {
        if features.is_empty() {
            return Err(StackError::MissingReferenceFeatures);
        }
        Ok(Self {
            reference,
            features,
            config,
        })
    }

    pub fn reference(&self) -> &Arc<StackImage> {
        &self.reference
    }

    pub fn features(&self) -> &CornerFeatures {
        &self.features
    }

    /// Aligns one candidate against the reference. Soft failures (no
    /// correspondence, inconsistent transform) degrade to `Rejected`
    /// so a single bad frame never aborts the batch.
    pub fn align(&self, candidate: Arc<StackImage>) -> AlignOutcome {
        let start = Instant::now();
        let matched =
            matching::match_features(&self.reference, &self.features, &candidate, &self.config);

        match estimator::estimate_transform(&self.features, &matched, &self.config) {
            Ok(homography) => {
                let warped = warp::warp(
                    &candidate,
                    &homography,
                    self.reference.width(),
                    self.reference.height(),
                );
                log::info!(
                    "{} transformed in {} ms",
                    candidate.filename,
                    start.elapsed().as_millis()
                );
                AlignOutcome::Aligned(warped)
            }
            Err(err) => {
                log::warn!("{} rejected: {}", candidate.filename, err);
                AlignOutcome::Rejected(
                    Arc::try_unwrap(candidate).unwrap_or_else(|arc| (*arc).clone()),
                )
            }
        }
    }
}
