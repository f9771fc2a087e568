//! Polygon-backed domain boundary.

use geo::{Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use rstar::RTree;
use rstar::primitives::Line;

use super::traits::DistanceEvaluator;
use crate::io::GeoBoundingBox;

/// Water domain described by polygons.
///
/// A point is inside when it lies in one of the water polygons and in none
/// of the land polygons. The unsigned distance is the Euclidean distance
/// (degrees) to the nearest edge of any ring, found through an R-tree of
/// edge segments.
pub struct PolygonBoundary {
    water: MultiPolygon<f64>,
    land: MultiPolygon<f64>,
    edges: RTree<Line<[f64; 2]>>,
    bbox: GeoBoundingBox,
}

impl PolygonBoundary {
    /// Create a boundary from water and land polygons.
    pub fn new(water: MultiPolygon<f64>, land: MultiPolygon<f64>) -> Self {
        let edges = ring_edges(water.0.iter().chain(land.0.iter()));
        Self::with_edges(water, land, edges)
    }

    /// Rectangular water extent with land polygons cut out.
    ///
    /// The rectangle only decides inside/outside; distances are measured to
    /// the land rings, so open-ocean box sides are not coastline. With no
    /// land at all the box sides are the only edges left.
    pub fn from_bbox_and_land(bbox: GeoBoundingBox, land: MultiPolygon<f64>) -> Self {
        let exterior = LineString::from(vec![
            (bbox.min_lon, bbox.min_lat),
            (bbox.max_lon, bbox.min_lat),
            (bbox.max_lon, bbox.max_lat),
            (bbox.min_lon, bbox.max_lat),
            (bbox.min_lon, bbox.min_lat),
        ]);
        let water = MultiPolygon(vec![Polygon::new(exterior, vec![])]);

        let mut edges = ring_edges(land.0.iter());
        if edges.is_empty() {
            log::warn!("No land edges in the bounding box; measuring distance to the box sides");
            edges = ring_edges(water.0.iter());
        }
        Self::with_edges(water, land, edges)
    }

    /// Single water ring given as `(lon, lat)` vertices, with optional islands.
    pub fn from_ring(outer: &[(f64, f64)], islands: &[Vec<(f64, f64)>]) -> Self {
        let interiors = islands.iter().map(|r| LineString::from(r.clone())).collect();
        let polygon = Polygon::new(LineString::from(outer.to_vec()), interiors);
        Self::new(MultiPolygon(vec![polygon]), MultiPolygon(vec![]))
    }

    fn with_edges(water: MultiPolygon<f64>, land: MultiPolygon<f64>, edges: Vec<Line<[f64; 2]>>) -> Self {
        let bbox = bounding_box(&water);
        Self {
            water,
            land,
            edges: RTree::bulk_load(edges),
            bbox,
        }
    }

    /// Number of boundary edges.
    pub fn edge_count(&self) -> usize {
        self.edges.size()
    }

    fn unsigned_distance(&self, lon: f64, lat: f64) -> f64 {
        use rstar::PointDistance;

        let p = [lon, lat];
        self.edges
            .nearest_neighbor(&p)
            .map(|edge| edge.distance_2(&p).sqrt())
            .unwrap_or(f64::MAX)
    }
}

impl DistanceEvaluator for PolygonBoundary {
    fn signed_distance(&self, lon: f64, lat: f64) -> f64 {
        let d = self.unsigned_distance(lon, lat);
        let p = Point::new(lon, lat);
        if self.water.contains(&p) && !self.land.contains(&p) {
            -d
        } else {
            d
        }
    }

    fn bbox(&self) -> GeoBoundingBox {
        self.bbox
    }
}

fn ring_edges<'a>(polygons: impl Iterator<Item = &'a Polygon<f64>>) -> Vec<Line<[f64; 2]>> {
    let mut segments = Vec::new();
    for polygon in polygons {
        collect_edges(polygon.exterior(), &mut segments);
        for ring in polygon.interiors() {
            collect_edges(ring, &mut segments);
        }
    }
    segments
}

fn collect_edges(ring: &LineString<f64>, out: &mut Vec<Line<[f64; 2]>>) {
    for line in ring.lines() {
        if line.start != line.end {
            out.push(Line::new(to_array(line.start), to_array(line.end)));
        }
    }
}

fn to_array(c: Coord<f64>) -> [f64; 2] {
    [c.x, c.y]
}

fn bounding_box(polygons: &MultiPolygon<f64>) -> GeoBoundingBox {
    let mut bbox = GeoBoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for c in polygons.0.iter().flat_map(|p| p.exterior().coords()) {
        bbox.min_lon = bbox.min_lon.min(c.x);
        bbox.min_lat = bbox.min_lat.min(c.y);
        bbox.max_lon = bbox.max_lon.max(c.x);
        bbox.max_lat = bbox.max_lat.max(c.y);
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> PolygonBoundary {
        PolygonBoundary::from_ring(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
            &[],
        )
    }

    #[test]
    fn test_inside_negative() {
        let b = unit_square();
        assert_relative_eq!(b.signed_distance(0.5, 0.5), -0.5);
        assert_relative_eq!(b.signed_distance(0.1, 0.5), -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_positive() {
        let b = unit_square();
        assert_relative_eq!(b.signed_distance(1.5, 0.5), 0.5, epsilon = 1e-12);
        assert_relative_eq!(b.signed_distance(2.0, 2.0), 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_island_is_outside() {
        let island = vec![(0.4, 0.4), (0.6, 0.4), (0.6, 0.6), (0.4, 0.6), (0.4, 0.4)];
        let b = PolygonBoundary::from_ring(
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
            &[island],
        );
        assert!(b.signed_distance(0.5, 0.5) > 0.0);
        assert_relative_eq!(b.signed_distance(0.3, 0.5), -0.1, epsilon = 1e-12);
        assert_eq!(b.edge_count(), 8);
    }

    #[test]
    fn test_bbox_from_polygons() {
        let b = unit_square();
        assert_eq!(b.bbox(), GeoBoundingBox::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_box_sides_are_not_coastline() {
        let bbox = GeoBoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let land = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (0.2, 0.0), (0.2, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )]);
        let b = PolygonBoundary::from_bbox_and_land(bbox, land);

        assert_eq!(b.edge_count(), 4);
        // Next to the open eastern side, but 0.75 from the western land strip
        assert_relative_eq!(b.signed_distance(0.95, 0.5), -0.75, epsilon = 1e-12);
        assert!(b.signed_distance(0.1, 0.5) > 0.0);
        assert!(b.signed_distance(1.5, 0.5) > 0.0);
    }

    #[test]
    fn test_box_without_land_uses_sides() {
        let bbox = GeoBoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = PolygonBoundary::from_bbox_and_land(bbox, MultiPolygon(vec![]));
        assert_eq!(b.edge_count(), 4);
        assert_relative_eq!(b.signed_distance(0.9, 0.5), -0.1, epsilon = 1e-12);
    }
}
