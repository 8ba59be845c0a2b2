use image_stacker::*;

/// Texture whose area delta is nonzero for every offset reachable within
/// the search radius: per-cell channel difference for offset (i, j) is
/// i + 7j, which vanishes only at (0, 0) for |i|, |j| <= 6.
fn ramp_image() -> StackImage {
    StackImage::from_fn(36, 36, |x, y| Pixel::new(x as u8, (7 * y) as u8, 100))
}

#[test]
fn test_match_is_idempotent() {
    let config = StackConfig::default();
    let img = ramp_image();

    let point = find_near_point(&img, &img, 18, 18, 6, &config).unwrap();
    assert_eq!((point.x, point.y), (18, 18));
    assert_eq!(point.delta, 0.0);
    assert_eq!(point.pixel, img.get_pixel(18, 18));
}

#[test]
fn test_match_rejected_above_threshold() {
    let config = StackConfig::default();
    let reference = ramp_image();
    let featureless = StackImage::from_fn(36, 36, |_, _| Pixel::new(0, 0, 0));

    let point = find_near_point(&reference, &featureless, 18, 18, 6, &config);
    assert!(point.is_none());
}

#[test]
fn test_match_finds_shifted_patch() {
    let config = StackConfig::default();
    let reference = ramp_image();
    // Same texture displaced by (2, 1): the content at reference (18, 18)
    // sits at (16, 17) in the candidate.
    let candidate =
        StackImage::from_fn(36, 36, |x, y| Pixel::new((x + 2) as u8, (7 * (y + 1)) as u8, 100));

    let point = find_near_point(&reference, &candidate, 18, 18, 6, &config).unwrap();
    assert_eq!((point.x, point.y), (16, 17));
    assert_eq!(point.delta, 0.0);
}

#[test]
fn test_match_features_slot_alignment() {
    let config = StackConfig::default();
    let img = ramp_image();

    let point_grid = |coords: &[(i32, i32)]| -> Vec<FeaturePoint> {
        coords
            .iter()
            .map(|&(x, y)| FeaturePoint::new(x, y, img.get_pixel(x, y), 0.0))
            .collect()
    };
    let features = CornerFeatures {
        top_left: point_grid(&[(10, 10)]),
        top_right: point_grid(&[(26, 10)]),
        bottom_left: point_grid(&[(10, 26)]),
        bottom_right: point_grid(&[(26, 26)]),
    };

    let matched = match_features(&img, &features, &img, &config);
    for quadrant in Quadrant::ALL {
        let source = features.quadrant(quadrant);
        let hits = matched.quadrant(quadrant);
        assert_eq!(hits.len(), source.len());

        let hit = hits[0].as_ref().unwrap();
        assert_eq!((hit.x, hit.y), (source[0].x, source[0].y));
        assert_eq!(hit.delta, 0.0);
    }
}
