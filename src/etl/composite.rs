use log::{debug, info};

use crate::data::osm::Way;
use crate::data::render::{Category, Color, RenderPath, StrokeCap, Style};
use crate::data::OsmMapData;
use crate::errors::Result;
use crate::etl::build_path::build_path;
use crate::etl::categorize::CategorizedWays;
use crate::etl::project::Projection;
use crate::etl::Etl;

const ETL_NAME: &str = "composite";

pub const DEFAULT_CANVAS_SIZE: f64 = 3000.0;

struct HighwayStyle {
    highway: &'static str,
    width: f64,
    color: Color,
}

const MAJOR_ROAD: Color = Color::rgb(0xFD, 0xE0, 0x47);
const MINOR_ROAD: Color = Color::rgb(0xFB, 0xBF, 0x24);
const FOOT_ROAD: Color = Color::rgb(0xE5, 0xE7, 0xEB);

/// Stroke per `highway` tag value.
const HIGHWAY_STYLES: &[HighwayStyle] = &[
    HighwayStyle { highway: "motorway", width: 28.0, color: MAJOR_ROAD },
    HighwayStyle { highway: "trunk", width: 26.0, color: MAJOR_ROAD },
    HighwayStyle { highway: "primary", width: 22.0, color: MAJOR_ROAD },
    HighwayStyle { highway: "secondary", width: 18.0, color: MINOR_ROAD },
    HighwayStyle { highway: "tertiary", width: 14.0, color: MINOR_ROAD },
    HighwayStyle { highway: "residential", width: 8.0, color: Color::rgb(0xFF, 0xFF, 0xFF) },
    HighwayStyle { highway: "service", width: 6.0, color: Color::rgb(0xF5, 0xF5, 0xF0) },
    HighwayStyle { highway: "footway", width: 4.0, color: FOOT_ROAD },
    HighwayStyle { highway: "path", width: 3.0, color: FOOT_ROAD },
];

static UNKNOWN_HIGHWAY: HighwayStyle = HighwayStyle {
    highway: "default",
    width: 12.0,
    color: Color::rgb(0x94, 0xA3, 0xB8),
};

/// Highway kinds drawn see-through so what lies under them stays visible.
const TRANSLUCENT_HIGHWAYS: &[&str] = &["motorway", "trunk"];
const TRANSLUCENT_HIGHWAY_OPACITY: f64 = 0.75;

/// Fixed styles of the polygon layers.
const AREA_STYLES: &[(Category, Style)] = &[
    (
        Category::Water,
        Style {
            fill: Some(Color::rgb(0xA7, 0xD3, 0xF0)),
            stroke: Color::rgb(0x91, 0xB8, 0xD1),
            stroke_width: 2.0,
            opacity: 0.8,
            cap: StrokeCap::Butt,
        },
    ),
    (
        Category::Park,
        Style {
            fill: Some(Color::rgb(0xC8, 0xE6, 0xC9)),
            stroke: Color::rgb(0xA5, 0xD6, 0xA7),
            stroke_width: 2.0,
            opacity: 1.0,
            cap: StrokeCap::Butt,
        },
    ),
    (
        Category::Building,
        Style {
            fill: Some(Color::rgb(0xE5, 0xE3, 0xDF)),
            stroke: Color::rgb(0xD1, 0xCF, 0xCB),
            stroke_width: 1.0,
            opacity: 1.0,
            cap: StrokeCap::Butt,
        },
    ),
];

pub fn highway_style(highway: &str) -> Style {
    let entry = HIGHWAY_STYLES
        .iter()
        .find(|style| style.highway == highway)
        .unwrap_or(&UNKNOWN_HIGHWAY);
    let opacity = if TRANSLUCENT_HIGHWAYS.iter().any(|kind| *kind == highway) {
        TRANSLUCENT_HIGHWAY_OPACITY
    } else {
        1.0
    };
    Style {
        fill: None,
        stroke: entry.color,
        stroke_width: entry.width,
        opacity,
        cap: StrokeCap::Round,
    }
}

/// Style for a way of `category`, or `None` for categories that aren't drawn.
pub fn style_for(category: Category, way: &Way) -> Option<Style> {
    match category {
        Category::Highway => Some(highway_style(way.tag("highway").unwrap_or_default())),
        Category::Other => None,
        _ => AREA_STYLES
            .iter()
            .find(|(area, _)| *area == category)
            .map(|(_, style)| *style),
    }
}

/// Builds the draw list, back to front: water, parks, buildings, highways.
/// Ways with no resolvable node produce nothing.
pub fn composite(
    categorized: &CategorizedWays,
    data: &OsmMapData,
    canvas_width: f64,
    canvas_height: f64,
) -> Result<Vec<RenderPath>> {
    let projection = Projection::new(&data.bounds, canvas_width, canvas_height)?;
    let mut paths = Vec::new();

    for category in Category::DRAW_ORDER {
        let closed = category != Category::Highway;
        for way in categorized.ways(category, &data.ways) {
            let Some(style) = style_for(category, way) else {
                continue;
            };
            match build_path(way, &data.nodes, &projection, closed) {
                Some(geometry) => paths.push(RenderPath {
                    way_id: way.id.clone(),
                    category,
                    points: geometry.points,
                    closed: geometry.closed,
                    style,
                }),
                None => {
                    debug!(way_id = way.id.as_str(), category = category.name(); "Way has no resolvable nodes");
                },
            }
        }
    }
    Ok(paths)
}

pub struct CompositeEtl {
    canvas_width: f64,
    canvas_height: f64,
}

impl CompositeEtl {
    pub fn new(canvas_width: f64, canvas_height: f64) -> CompositeEtl {
        CompositeEtl {
            canvas_width,
            canvas_height,
        }
    }
}

impl Default for CompositeEtl {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE)
    }
}

impl Etl for CompositeEtl {
    type Input<'a> = (&'a OsmMapData, &'a CategorizedWays);
    type Output = Vec<RenderPath>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn transform(&mut self, input: Self::Input<'_>) -> Result<Vec<RenderPath>> {
        let (data, categorized) = input;
        let paths = composite(categorized, data, self.canvas_width, self.canvas_height)?;
        info!(etl_name = ETL_NAME, paths = paths.len(); "Composited layers");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::data::osm::{Bounds, Node};
    use crate::etl::categorize::categorize;

    fn tagged_way(id: &str, refs: &[&str], tags: &[(&str, &str)]) -> Way {
        Way {
            id: id.to_string(),
            node_refs: refs.iter().map(|r| r.to_string()).collect(),
            tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    fn data(ways: Vec<Way>) -> OsmMapData {
        let nodes = [(0.1, 0.1), (0.1, 0.9), (0.9, 0.9), (0.9, 0.1)]
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| {
                let id = (i + 1).to_string();
                (id.clone(), Node { id, lat: *lat, lon: *lon, tags: HashMap::new() })
            })
            .collect();
        OsmMapData {
            nodes,
            ways,
            bounds: Bounds::new(0.0, 0.0, 1.0, 1.0).unwrap(),
        }
    }

    #[test]
    fn highway_table() {
        let motorway = highway_style("motorway");
        assert_eq!(motorway.stroke_width, 28.0);
        assert_eq!(motorway.stroke.to_string(), "#FDE047");
        assert_eq!(motorway.opacity, 0.75);
        assert_eq!(motorway.cap, StrokeCap::Round);
        assert_eq!(motorway.fill, None);

        assert_eq!(highway_style("trunk").opacity, 0.75);
        assert_eq!(highway_style("primary").opacity, 1.0);
        assert_eq!(highway_style("tertiary").stroke.to_string(), "#FBBF24");
        assert_eq!(highway_style("residential").stroke.to_string(), "#FFFFFF");
        assert_eq!(highway_style("service").stroke.to_string(), "#F5F5F0");
        assert_eq!(highway_style("path").stroke_width, 3.0);
        assert_eq!(highway_style("path").stroke.to_string(), "#E5E7EB");

        let unknown = highway_style("bridleway");
        assert_eq!(unknown.stroke_width, 12.0);
        assert_eq!(unknown.stroke.to_string(), "#94A3B8");
        assert_eq!(unknown.opacity, 1.0);
    }

    #[test]
    fn draw_order_is_back_to_front_and_other_is_omitted() {
        let data = data(vec![
            tagged_way("road", &["1", "2"], &[("highway", "primary")]),
            tagged_way("house", &["1", "2", "3"], &[("building", "yes")]),
            tagged_way("fence", &["1", "2"], &[("barrier", "fence")]),
            tagged_way("lake", &["1", "2", "3", "4"], &[("natural", "water")]),
            tagged_way("green", &["2", "3", "4"], &[("leisure", "park")]),
        ]);
        let categorized = categorize(&data.ways);
        let paths = composite(&categorized, &data, 100.0, 100.0).unwrap();
        let keys: Vec<String> = paths.iter().map(RenderPath::key).collect();
        assert_eq!(keys, vec!["water-lake", "park-green", "building-house", "highway-road"]);
    }

    #[test]
    fn area_styles_and_closing() {
        let data = data(vec![
            tagged_way("lake", &["1", "2", "3", "4"], &[("natural", "water")]),
            tagged_way("green", &["2", "3", "4"], &[("leisure", "park")]),
            tagged_way("shed", &["1", "2"], &[("building", "shed")]),
        ]);
        let categorized = categorize(&data.ways);
        let paths = composite(&categorized, &data, 100.0, 100.0).unwrap();

        let lake = &paths[0];
        assert!(lake.closed);
        assert_eq!(lake.style.fill.map(|c| c.to_string()), Some("#A7D3F0".to_string()));
        assert_eq!(lake.style.stroke.to_string(), "#91B8D1");
        assert_eq!(lake.style.opacity, 0.8);

        let green = &paths[1];
        assert!(green.closed);
        assert_eq!(green.style.fill.map(|c| c.to_string()), Some("#C8E6C9".to_string()));
        assert_eq!(green.style.stroke_width, 2.0);

        let shed = &paths[2];
        assert!(!shed.closed);
        assert_eq!(shed.style.stroke_width, 1.0);
        assert_eq!(shed.style.stroke.to_string(), "#D1CFCB");
    }

    #[test]
    fn unresolvable_ways_are_skipped() {
        let data = data(vec![tagged_way("ghost", &["404"], &[("highway", "path")])]);
        let categorized = categorize(&data.ways);
        assert!(composite(&categorized, &data, 100.0, 100.0).unwrap().is_empty());
    }
}
