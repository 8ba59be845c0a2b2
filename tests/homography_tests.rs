use image_stacker::*;

const QUAD: [(f64, f64); 4] = [(10.0, 10.0), (90.0, 12.0), (11.0, 88.0), (92.0, 91.0)];

#[test]
fn test_identity_from_identical_points() {
    let h = estimate_homography(&QUAD, &QUAD).unwrap();

    for &(x, y) in &[(0.0, 0.0), (50.0, 50.0), (99.0, 3.0)] {
        let (px, py) = h.project(x, y);
        assert!((px - x).abs() < 1e-6, "x: {} vs {}", px, x);
        assert!((py - y).abs() < 1e-6, "y: {} vs {}", py, y);
    }
}

#[test]
fn test_translation_recovered_exactly() {
    let dst: Vec<(f64, f64)> = QUAD.iter().map(|&(x, y)| (x + 5.0, y - 3.0)).collect();
    let h = estimate_homography(&QUAD, &dst).unwrap();

    let (px, py) = h.project(20.0, 40.0);
    assert!((px - 25.0).abs() < 1e-6);
    assert!((py - 37.0).abs() < 1e-6);
}

#[test]
fn test_four_points_satisfied_exactly() {
    // A proper perspective distortion, not just an affinity.
    let dst = [(12.0, 9.0), (87.0, 15.0), (8.0, 92.0), (95.0, 85.0)];
    let h = estimate_homography(&QUAD, &dst).unwrap();

    for (src, expect) in QUAD.iter().zip(dst.iter()) {
        let err = h.reprojection_error(*src, *expect);
        assert!(err < 1e-6, "residual {} at {:?}", err, src);
    }
}

#[test]
fn test_too_few_points_fails() {
    let pts = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
    assert!(estimate_homography(&pts, &pts).is_none());
}

#[test]
fn test_reprojection_error_is_euclidean() {
    let h = Homography::identity();
    let err = h.reprojection_error((0.0, 0.0), (3.0, 4.0));
    assert!((err - 5.0).abs() < 1e-12);
}

#[test]
fn test_estimate_transform_identity_pair() {
    let config = StackConfig::default();
    let points = |coords: &[(i32, i32)]| -> Vec<FeaturePoint> {
        coords
            .iter()
            .map(|&(x, y)| FeaturePoint::new(x, y, None, 0.0))
            .collect()
    };
    let features = CornerFeatures {
        top_left: points(&[(10, 10), (20, 15)]),
        top_right: points(&[(90, 12), (80, 20)]),
        bottom_left: points(&[(11, 88)]),
        bottom_right: points(&[(92, 91)]),
    };
    // Candidate matched every point at the reference location.
    let matched = MatchedFeatures {
        top_left: features.top_left.iter().cloned().map(Some).collect(),
        top_right: features.top_right.iter().cloned().map(Some).collect(),
        bottom_left: features.bottom_left.iter().cloned().map(Some).collect(),
        bottom_right: features.bottom_right.iter().cloned().map(Some).collect(),
    };

    let h = estimate_transform(&features, &matched, &config).unwrap();
    let (px, py) = h.project(42.0, 17.0);
    assert!((px - 42.0).abs() < 1e-6);
    assert!((py - 17.0).abs() < 1e-6);
}

#[test]
fn test_estimate_transform_fails_on_empty_quadrant() {
    let config = StackConfig::default();
    let point = |x, y| FeaturePoint::new(x, y, None, 0.0);
    let features = CornerFeatures {
        top_left: vec![point(10, 10)],
        top_right: vec![point(90, 12)],
        bottom_left: vec![point(11, 88)],
        bottom_right: vec![point(92, 91)],
    };
    let matched = MatchedFeatures {
        top_left: vec![Some(point(10, 10))],
        top_right: vec![None],
        bottom_left: vec![Some(point(11, 88))],
        bottom_right: vec![Some(point(92, 91))],
    };

    let err = estimate_transform(&features, &matched, &config).unwrap_err();
    assert_eq!(err, StackError::NoCorrespondence(Quadrant::TopRight));
}

#[test]
fn test_estimate_transform_picks_lowest_delta_slot() {
    let config = StackConfig::default();
    let point = |x, y, d| FeaturePoint::new(x, y, None, d);
    let features = CornerFeatures {
        top_left: vec![point(10, 10, 0.0), point(20, 20, 0.0)],
        top_right: vec![point(90, 12, 0.0)],
        bottom_left: vec![point(11, 88, 0.0)],
        bottom_right: vec![point(92, 91, 0.0)],
    };
    // Slot 0 matched sloppily (and inconsistently), slot 1 cleanly at a
    // pure +4 x-shift consistent with every other quadrant.
    let matched = MatchedFeatures {
        top_left: vec![Some(point(9, 16, 0.9)), Some(point(24, 20, 0.1))],
        top_right: vec![Some(point(94, 12, 0.2))],
        bottom_left: vec![Some(point(15, 88, 0.2))],
        bottom_right: vec![Some(point(96, 91, 0.2))],
    };

    // The sloppy slot 0 loses the selection but still participates in the
    // consistency gate; with a loose bound the +4 shift is accepted.
    let config = StackConfig {
        max_reprojection_error: 8.0,
        ..config
    };
    let h = estimate_transform(&features, &matched, &config).unwrap();
    let (px, py) = h.project(50.0, 50.0);
    assert!((px - 54.0).abs() < 1e-6);
    assert!((py - 50.0).abs() < 1e-6);
}

#[test]
fn test_estimate_transform_gated_on_reprojection_error() {
    let config = StackConfig::default();
    let point = |x, y, d| FeaturePoint::new(x, y, None, d);
    let features = CornerFeatures {
        top_left: vec![point(10, 10, 0.0), point(20, 20, 0.0)],
        top_right: vec![point(90, 12, 0.0)],
        bottom_left: vec![point(11, 88, 0.0)],
        bottom_right: vec![point(92, 91, 0.0)],
    };
    // Slot 0 of the top-left quadrant disagrees with the transform the
    // four representatives pin down, by far more than the default bound.
    let matched = MatchedFeatures {
        top_left: vec![Some(point(30, 35, 0.9)), Some(point(20, 20, 0.1))],
        top_right: vec![Some(point(90, 12, 0.2))],
        bottom_left: vec![Some(point(11, 88, 0.2))],
        bottom_right: vec![Some(point(92, 91, 0.2))],
    };

    let err = estimate_transform(&features, &matched, &config).unwrap_err();
    assert_eq!(err, StackError::DegenerateTransform);
}
