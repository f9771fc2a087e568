//! Feature-size criterion on polygon boundaries.

use sizefield_rs::criteria::{feature_size_layer, signed_distance_field};
use sizefield_rs::geometry::PolygonBoundary;
use sizefield_rs::io::degrees_to_meters;
use sizefield_rs::{DistanceEvaluator, FeatureSizeParams, Grid};

use approx::assert_relative_eq;

/// Straight channel 0.01° wide (~1.1 km) along the equator.
fn channel() -> PolygonBoundary {
    PolygonBoundary::from_ring(
        &[(0.0, 0.0), (0.1, 0.0), (0.1, 0.01), (0.0, 0.01), (0.0, 0.0)],
        &[],
    )
}

#[test]
fn test_channel_width_recovered() {
    let boundary = channel();
    let grid = Grid::from_bbox(&boundary.bbox(), None, 50.0).unwrap();
    let distance = signed_distance_field(&grid, &boundary);
    let fs = feature_size_layer(&grid, &distance, 50.0, &FeatureSizeParams::new(3.0));

    assert!(!fs.medial_points.is_empty());
    // Medial points sit on the centreline away from the channel ends
    for &(lon, lat) in &fs.medial_points {
        if lon > 0.02 && lon < 0.08 {
            assert!((lat - 0.005).abs() < 2.0 * grid.dy(), "off-centre medial point at {}", lat);
        }
    }

    // fs = 2 · width/2 / R everywhere across the channel
    let expected_deg = 0.01 / 3.0;
    let (i, _) = grid.nearest_index(0.05, 0.0);
    for j in 2..grid.ny() - 2 {
        let lat = grid.lat(j);
        if lat > 0.0 && lat < 0.01 {
            assert_relative_eq!(fs.layer.get(i, j), expected_deg, max_relative = 0.15);
        }
    }
    assert_relative_eq!(
        degrees_to_meters(fs.layer.get(i, grid.ny() / 2), 0.005),
        0.01 / 3.0 * 111_000.0,
        max_relative = 0.15
    );
}

#[test]
fn test_wider_channel_gets_larger_size() {
    let narrow = channel();
    let wide = PolygonBoundary::from_ring(
        &[(0.0, 0.0), (0.1, 0.0), (0.1, 0.03), (0.0, 0.03), (0.0, 0.0)],
        &[],
    );

    let size_at_centre = |boundary: &PolygonBoundary, lat: f64| {
        let grid = Grid::from_bbox(&boundary.bbox(), None, 50.0).unwrap();
        let distance = signed_distance_field(&grid, boundary);
        let fs = feature_size_layer(&grid, &distance, 50.0, &FeatureSizeParams::new(3.0));
        let (i, j) = grid.nearest_index(0.05, lat);
        fs.layer.get(i, j)
    };

    assert!(size_at_centre(&wide, 0.015) > 2.0 * size_at_centre(&narrow, 0.005));
}
