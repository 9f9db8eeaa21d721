use std::collections::HashMap;

use log::debug;

use crate::data::osm::{Node, OsmId, Way};
use crate::data::render::PixelPoint;
use crate::etl::project::Projection;

/// Projected points of one way. When `closed` is set the first point is
/// repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometry {
    pub points: Vec<PixelPoint>,
    pub closed: bool,
}

/// Resolves and projects the nodes of `way` in order.
///
/// References to nodes missing from `nodes` are skipped. Returns `None` when
/// nothing resolves. A path with fewer than three points is never closed, even
/// if `closed` was requested.
pub fn build_path(
    way: &Way,
    nodes: &HashMap<OsmId, Node>,
    projection: &Projection,
    closed: bool,
) -> Option<PathGeometry> {
    let mut points: Vec<PixelPoint> = way
        .node_refs
        .iter()
        .filter_map(|node_ref| nodes.get(node_ref))
        .map(|node| projection.project(node.lat, node.lon))
        .collect();

    let dropped = way.node_refs.len() - points.len();
    if dropped > 0 {
        debug!(way_id = way.id.as_str(), dropped = dropped; "Dropped dangling node refs");
    }

    if points.is_empty() {
        return None;
    }

    let closed = closed && points.len() >= 3;
    if closed {
        points.push(points[0]);
    }
    Some(PathGeometry { points, closed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::osm::Bounds;

    fn node(id: &str, lat: f64, lon: f64) -> (OsmId, Node) {
        (
            id.to_string(),
            Node {
                id: id.to_string(),
                lat,
                lon,
                tags: HashMap::new(),
            },
        )
    }

    fn fixture() -> (HashMap<OsmId, Node>, Projection) {
        let nodes = [
            node("1", 0.0, 0.0),
            node("2", 0.0, 1.0),
            node("3", 1.0, 1.0),
            node("4", 1.0, 0.0),
        ]
        .into_iter()
        .collect();
        let bounds = Bounds::new(0.0, 0.0, 1.0, 1.0).unwrap();
        (nodes, Projection::new(&bounds, 100.0, 100.0).unwrap())
    }

    fn way(refs: &[&str]) -> Way {
        Way {
            id: "w".to_string(),
            node_refs: refs.iter().map(|r| r.to_string()).collect(),
            tags: HashMap::new(),
        }
    }

    #[test]
    fn closes_polygons_with_three_or_more_points() {
        let (nodes, projection) = fixture();
        let path = build_path(&way(&["1", "2", "3"]), &nodes, &projection, true).unwrap();
        assert!(path.closed);
        assert_eq!(path.points.len(), 4);
        assert_eq!(path.points.first(), path.points.last());
    }

    #[test]
    fn short_paths_stay_open() {
        let (nodes, projection) = fixture();
        let path = build_path(&way(&["1", "2"]), &nodes, &projection, true).unwrap();
        assert!(!path.closed);
        assert_eq!(path.points.len(), 2);
    }

    #[test]
    fn dangling_refs_are_dropped_in_order() {
        let (nodes, projection) = fixture();
        let path = build_path(&way(&["4", "missing", "2", "gone", "1"]), &nodes, &projection, false).unwrap();
        assert_eq!(
            path.points,
            vec![
                PixelPoint::new(0.0, 0.0),
                PixelPoint::new(100.0, 100.0),
                PixelPoint::new(0.0, 100.0),
            ]
        );
    }

    #[test]
    fn nothing_resolves_means_no_path() {
        let (nodes, projection) = fixture();
        assert_eq!(build_path(&way(&["x", "y"]), &nodes, &projection, true), None);
        assert_eq!(build_path(&way(&[]), &nodes, &projection, false), None);
    }
}
