use crate::data::Quadrant;

/// Failures the alignment and stacking pipeline can report.
///
/// `NoCorrespondence` is recoverable: the pipeline degrades the affected
/// candidate to a rejected outcome and keeps processing the batch. The
/// remaining variants are structural and abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum StackError {
    /// Alignment attempted before the reference image's corner points
    /// exist. Signals a caller ordering bug.
    MissingReferenceFeatures,
    /// Configured feature sample count is not a perfect square.
    InvalidSampleCount(usize),
    /// A corner quadrant produced no usable match for this candidate.
    NoCorrespondence(Quadrant),
    /// The four correspondences form a degenerate configuration or the
    /// solved transform fails the reprojection consistency check.
    DegenerateTransform,
    /// Aggregation invoked with zero images.
    EmptyBatch,
}

impl std::fmt::Display for StackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingReferenceFeatures => {
                write!(f, "reference image has no corner feature points")
            }
            Self::InvalidSampleCount(n) => {
                write!(f, "sample count must be a perfect square, got {}", n)
            }
            Self::NoCorrespondence(quadrant) => {
                write!(f, "no correspondence found in {} quadrant", quadrant)
            }
            Self::DegenerateTransform => {
                write!(f, "estimated transform is degenerate or inconsistent")
            }
            Self::EmptyBatch => write!(f, "no images to stack"),
        }
    }
}

impl std::error::Error for StackError {}
