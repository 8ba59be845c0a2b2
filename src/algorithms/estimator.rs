use crate::algorithms::homography::{estimate_homography, Homography};
use crate::config::StackConfig;
use crate::data::{CornerFeatures, FeaturePoint, MatchedFeatures, Quadrant};
use crate::error::StackError;

/// Picks each quadrant's representative correspondence: among the slots
/// where a match exists, the one with the lowest match delta. Fails when
/// a quadrant produced no matches at all.
fn best_slot(
    quadrant: Quadrant,
    matched: &[Option<FeaturePoint>],
) -> Result<usize, StackError> {
    matched
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.as_ref().map(|p| (i, p.delta)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .ok_or(StackError::NoCorrespondence(quadrant))
}

/// Computes the reference-to-candidate transform from the four quadrant
/// correspondences, then gates it on reprojection error over every
/// matched point so a bad solve is rejected instead of silently accepted.
pub fn estimate_transform(
    features: &CornerFeatures,
    matched: &MatchedFeatures,
    config: &StackConfig,
) -> Result<Homography, StackError> {
    let mut src = Vec::with_capacity(4);
    let mut dst = Vec::with_capacity(4);

    for quadrant in Quadrant::ALL {
        let reference = features.quadrant(quadrant);
        let candidates = matched.quadrant(quadrant);

        let slot = best_slot(quadrant, candidates)?;
        let fix = &reference[slot];
        let Some(hit) = candidates[slot].as_ref() else {
            return Err(StackError::NoCorrespondence(quadrant));
        };

        log::debug!(
            "{} correspondence: slot {}, ({}, {}) -> ({}, {}), delta {:.3}",
            quadrant,
            slot,
            fix.x,
            fix.y,
            hit.x,
            hit.y,
            hit.delta
        );

        src.push((fix.x as f64, fix.y as f64));
        dst.push((hit.x as f64, hit.y as f64));
    }

    let homography =
        estimate_homography(&src, &dst).ok_or(StackError::DegenerateTransform)?;

    check_consistency(&homography, features, matched, config)?;
    Ok(homography)
}

/// Reprojects every matched slot pair through the estimated transform and
/// rejects the estimate when the worst error exceeds the configured bound.
fn check_consistency(
    homography: &Homography,
    features: &CornerFeatures,
    matched: &MatchedFeatures,
    config: &StackConfig,
) -> Result<(), StackError> {
    for quadrant in Quadrant::ALL {
        let reference = features.quadrant(quadrant);
        let candidates = matched.quadrant(quadrant);

        for (fix, hit) in reference.iter().zip(candidates.iter()) {
            let Some(hit) = hit else { continue };
            let error = homography.reprojection_error(
                (fix.x as f64, fix.y as f64),
                (hit.x as f64, hit.y as f64),
            );
            if !error.is_finite() || error > config.max_reprojection_error {
                log::warn!(
                    "transform rejected: {} point ({}, {}) reprojects with error {:.2} px",
                    quadrant,
                    fix.x,
                    fix.y,
                    error
                );
                return Err(StackError::DegenerateTransform);
            }
        }
    }
    Ok(())
}
