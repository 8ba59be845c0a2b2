use image_stacker::*;

/// Brightness cone peaking at (px, py): strictly decreasing with
/// Chebyshev distance, so the radius-averaged maximum is unique.
fn cone_image(width: u32, height: u32, px: i32, py: i32) -> StackImage {
    StackImage::from_fn(width, height, |x, y| {
        let d = (x as i32 - px).abs().max((y as i32 - py).abs());
        let v = (255 - 30 * d).max(0) as u8;
        Pixel::new(v, v, v)
    })
}

#[test]
fn test_single_peak_selected_exactly() {
    let config = StackConfig {
        sample_count: 1,
        ..StackConfig::default()
    };
    // Peak inside the top-left region's single cell scan window.
    let img = cone_image(100, 100, 20, 20);

    let features = find_corner_points(&img, &config);
    assert_eq!(features.top_left.len(), 1);
    assert_eq!(features.top_left[0].x, 20);
    assert_eq!(features.top_left[0].y, 20);
    assert_eq!(features.top_left[0].pixel, Some(Pixel::new(255, 255, 255)));
}

#[test]
fn test_peak_lands_in_center_cell_slot() {
    let config = StackConfig::default();
    let img = cone_image(100, 100, 20, 20);

    let features = find_corner_points(&img, &config);
    // 3x3 grid per quadrant; (20, 20) falls in the middle cell (slot 4)
    // of the top-left region.
    assert_eq!(features.top_left.len(), 9);
    assert_eq!(features.top_left[4].x, 20);
    assert_eq!(features.top_left[4].y, 20);
}

#[test]
fn test_dark_cells_yield_zeroed_points() {
    let config = StackConfig::default();
    let img = StackImage::from_fn(100, 100, |_, _| Pixel::new(0, 0, 0));

    let features = find_corner_points(&img, &config);
    for quadrant in Quadrant::ALL {
        for point in features.quadrant(quadrant) {
            assert_eq!((point.x, point.y), (0, 0));
            assert_eq!(point.pixel, None);
        }
    }
}

#[test]
fn test_quadrants_are_fully_populated() {
    let config = StackConfig::default();
    let img = cone_image(200, 160, 30, 30);

    let features = find_corner_points(&img, &config);
    assert!(!features.is_empty());
    for quadrant in Quadrant::ALL {
        assert_eq!(features.quadrant(quadrant).len(), config.sample_count);
    }
}

#[test]
fn test_average_in_radius_uniform_image() {
    let img = StackImage::from_fn(20, 20, |_, _| Pixel::new(40, 80, 120));

    let avg = average_in_radius(&img, 10, 10, 4).unwrap();
    assert_eq!(avg, Pixel::new(40, 80, 120));
}

#[test]
fn test_average_in_radius_outside_image() {
    let img = StackImage::from_fn(20, 20, |_, _| Pixel::new(10, 10, 10));

    // Window entirely out of bounds: no contributing pixels.
    assert_eq!(average_in_radius(&img, -10, -10, 4), None);
    // Window clipped at the border still averages what it can reach.
    assert!(average_in_radius(&img, 0, 0, 4).is_some());
}
