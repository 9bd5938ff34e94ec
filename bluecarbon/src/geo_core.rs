use geo::{Coord, LineString, Polygon};
use geojson::PolygonType;
use serde::{Deserialize, Serialize};

use crate::collect::earth_engine::{algorithms, Node};

/// Bounding box structure (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Closed ring walking the corners: (min,min) (min,max) (max,max) (max,min) (min,min)
    /// Winding is not normalized and min < max is not enforced.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                Coord {
                    x: self.min_x,
                    y: self.min_y,
                },
                Coord {
                    x: self.min_x,
                    y: self.max_y,
                },
                Coord {
                    x: self.max_x,
                    y: self.max_y,
                },
                Coord {
                    x: self.max_x,
                    y: self.min_y,
                },
                Coord {
                    x: self.min_x,
                    y: self.min_y,
                },
            ]),
            vec![],
        )
    }
}

/// Query region sent to the platform
///
/// Holds polygon rings as GeoJSON positions: first ring exterior, the rest
/// holes. Caller-supplied rings are kept exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    rings: PolygonType,
}

impl Region {
    pub fn from_bbox(bbox: &BoundingBox) -> Self {
        let polygon = bbox.to_polygon();
        let rings = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
            .collect();
        Region { rings }
    }

    /// Pass-through: closure and winding are not checked
    pub fn from_rings(rings: PolygonType) -> Self {
        Region { rings }
    }

    pub fn rings(&self) -> &PolygonType {
        &self.rings
    }

    /// `ee.Geometry.Polygon(rings)`
    pub fn to_node(&self) -> Node {
        algorithms::polygon(&self.rings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let bbox: BoundingBox = BoundingBox::new(88.7, 21.5, 89.0, 22.0);
        assert_eq!(bbox.min_x, 88.7);
        assert_eq!(bbox.max_x, 89.0);
    }

    #[test]
    fn test_region_from_bbox_is_closed_five_point_ring() {
        let region = Region::from_bbox(&BoundingBox::new(88.7, 21.5, 89.0, 22.0));
        assert_eq!(region.rings().len(), 1);

        let ring = &region.rings()[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(
            ring,
            &vec![
                vec![88.7, 21.5],
                vec![88.7, 22.0],
                vec![89.0, 22.0],
                vec![89.0, 21.5],
                vec![88.7, 21.5],
            ]
        );
    }

    #[test]
    fn test_region_from_inverted_bbox_is_still_closed() {
        // min > max is passed through to the platform
        let region = Region::from_bbox(&BoundingBox::new(10.0, 5.0, -10.0, -5.0));
        let ring = &region.rings()[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[2], vec![-10.0, -5.0]);
    }

    #[test]
    fn test_region_from_rings_is_unchanged() {
        // Open ring: not closed by the builder
        let rings = vec![vec![vec![88.7, 21.5], vec![89.0, 21.5], vec![89.0, 22.0]]];
        let region = Region::from_rings(rings.clone());
        assert_eq!(region.rings(), &rings);
    }
}
