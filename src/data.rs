use std::collections::HashMap;

use self::osm::{Bounds, Node, OsmId, Way};

pub mod osm;
pub mod render;

/// Map data as defined in the .osm file. Relations and metadata are discarded,
/// everything else is kept without any processing.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmMapData {
    pub nodes: HashMap<OsmId, Node>,
    pub ways: Vec<Way>,
    pub bounds: Bounds,
}
