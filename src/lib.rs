//! Turns an OpenStreetMap XML extract into a styled, projected draw list for a
//! fixed square canvas, and tracks the pan/zoom transform the canvas is viewed
//! through.
//!
//! The stages run in order: [`etl::parse_osm`] reads nodes, ways and bounds,
//! [`etl::categorize`] sorts ways into layers, [`etl::composite`] projects
//! and styles them back to front. [`etl_engine::MapPipeline`] chains the
//! three and [`etl_engine::MapLoader`] decides which load result is shown.
//! [`viewport::ViewportController`] is independent of the data.

pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod etl_engine;
pub mod viewport;

pub use crate::data::osm::{Bounds, Node, OsmId, Tags, Way};
pub use crate::data::render::{Category, Color, PixelPoint, RenderPath, StrokeCap, Style};
pub use crate::data::OsmMapData;
pub use crate::errors::{Error, ErrorKind, Result};
pub use crate::etl_engine::{LoadOutcome, LoadTicket, MapLoader, MapPipeline, RenderedMap};
pub use crate::viewport::{ViewportController, ViewportState, ZoomDirection};
