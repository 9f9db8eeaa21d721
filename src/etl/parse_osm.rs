use std::collections::HashMap;

use log::{debug, info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::data::osm::{Bounds, Node, OsmId, Way};
use crate::data::OsmMapData;
use crate::errors::{Error, Result};
use crate::etl::Etl;

const ETL_NAME: &str = "parse_osm";

/// Element currently being filled in, with the depth it was opened at.
enum ParserState {
    Top,
    Node { node: Node, depth: usize },
    Way { way: Way, depth: usize },
    /// Relations and anything else we don't keep, children included.
    Skip { depth: usize },
}

struct OsmParser {
    bounds: Option<Bounds>,
    nodes: HashMap<OsmId, Node>,
    ways: Vec<Way>,
    state: ParserState,
    depth: usize,
}

impl OsmParser {
    fn new() -> Self {
        OsmParser {
            bounds: None,
            nodes: HashMap::new(),
            ways: Vec::new(),
            state: ParserState::Top,
            depth: 0,
        }
    }

    fn attribute(el: &BytesStart, key: &[u8]) -> Result<Option<String>> {
        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            if attribute.key.as_ref() == key {
                return Ok(Some(attribute.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }

    fn required_attribute(el: &BytesStart, key: &str) -> Result<String> {
        Self::attribute(el, key.as_bytes())?.ok_or_else(|| {
            Error::parse(format!(
                "<{}> element is missing the `{}` attribute",
                String::from_utf8_lossy(el.name().as_ref()),
                key
            ))
        })
    }

    fn coordinate(el: &BytesStart, key: &str) -> Result<f64> {
        let value = Self::required_attribute(el, key)?;
        match value.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(parsed),
            _ => Err(Error::parse(format!("non-numeric {} value `{}`", key, value))),
        }
    }

    fn parse_bounds(el: &BytesStart) -> Result<Bounds> {
        let bound = |key: &str| -> Result<f64> {
            Self::coordinate(el, key)
                .map_err(|err| Error::parse(format!("invalid bounds: {}", err.message)))
        };
        Bounds::new(bound("minlat")?, bound("minlon")?, bound("maxlat")?, bound("maxlon")?)
    }

    fn parse_node(el: &BytesStart) -> Result<Node> {
        Ok(Node {
            id: Self::required_attribute(el, "id")?,
            lat: Self::coordinate(el, "lat")?,
            lon: Self::coordinate(el, "lon")?,
            tags: HashMap::new(),
        })
    }

    fn parse_way(el: &BytesStart) -> Result<Way> {
        Ok(Way {
            id: Self::required_attribute(el, "id")?,
            node_refs: Vec::new(),
            tags: HashMap::new(),
        })
    }

    fn parse_tag(el: &BytesStart) -> Result<(String, String)> {
        Ok((
            Self::required_attribute(el, "k")?,
            Self::required_attribute(el, "v")?,
        ))
    }

    /// Handles an opening (or self-closing) element at `self.depth`.
    fn open(&mut self, el: &BytesStart, self_closing: bool) -> Result<()> {
        if matches!(self.state, ParserState::Top) {
            return self.open_top_level(el, self_closing);
        }
        match &mut self.state {
            ParserState::Node { node, .. } => {
                if el.name().as_ref() == b"tag" {
                    let (key, value) = Self::parse_tag(el)?;
                    node.tags.insert(key, value);
                }
            },
            ParserState::Way { way, .. } => match el.name().as_ref() {
                b"nd" => way.node_refs.push(Self::required_attribute(el, "ref")?),
                b"tag" => {
                    let (key, value) = Self::parse_tag(el)?;
                    way.tags.insert(key, value);
                },
                _ => (),
            },
            ParserState::Top | ParserState::Skip { .. } => (),
        }
        Ok(())
    }

    fn open_top_level(&mut self, el: &BytesStart, self_closing: bool) -> Result<()> {
        let depth = self.depth;
        match el.name().as_ref() {
            b"osm" => (),
            b"bounds" => {
                let bounds = Self::parse_bounds(el)?;
                if self.bounds.is_some() {
                    warn!(etl_name = ETL_NAME; "Ignoring additional <bounds> element");
                } else {
                    self.bounds = Some(bounds);
                }
            },
            b"node" => {
                let node = Self::parse_node(el)?;
                if self_closing {
                    self.nodes.insert(node.id.clone(), node);
                } else {
                    self.state = ParserState::Node { node, depth };
                }
            },
            b"way" => {
                let way = Self::parse_way(el)?;
                if self_closing {
                    self.ways.push(way);
                } else {
                    self.state = ParserState::Way { way, depth };
                }
            },
            other => {
                debug!(etl_name = ETL_NAME, element = &*String::from_utf8_lossy(other); "Skipping element");
                if !self_closing {
                    self.state = ParserState::Skip { depth };
                }
            },
        }
        Ok(())
    }

    /// Handles the closing tag of the element opened at `self.depth`.
    fn close(&mut self) {
        let closes_current = match &self.state {
            ParserState::Top => false,
            ParserState::Node { depth, .. }
            | ParserState::Way { depth, .. }
            | ParserState::Skip { depth } => *depth == self.depth,
        };
        if closes_current {
            match std::mem::replace(&mut self.state, ParserState::Top) {
                ParserState::Node { node, .. } => {
                    self.nodes.insert(node.id.clone(), node);
                },
                ParserState::Way { way, .. } => self.ways.push(way),
                _ => (),
            }
        }
    }

    fn finish(self) -> Result<OsmMapData> {
        let bounds = self.bounds.ok_or_else(|| Error::parse("missing bounds"))?;
        Ok(OsmMapData {
            nodes: self.nodes,
            ways: self.ways,
            bounds,
        })
    }
}

/// Parses an OSM XML document into its node table, way list and bounds.
///
/// Fails with a parse error when the document is not well formed, has no
/// usable `<bounds>`, or a node has missing or non-numeric coordinates.
/// Way node references are not checked against the node table.
pub fn parse_osm(text: &str) -> Result<OsmMapData> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);
    let mut parser = OsmParser::new();

    loop {
        let event = reader.read_event().map_err(|err| {
            Error::parse(format!("{} (at byte {})", err, reader.buffer_position()))
        })?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                parser.depth += 1;
                parser.open(&e, false)?;
            },
            Event::Empty(e) => {
                parser.depth += 1;
                parser.open(&e, true)?;
                parser.depth -= 1;
            },
            Event::End(_e) => {
                parser.close();
                parser.depth = parser.depth.saturating_sub(1);
            },
            // Text inside skipped elements such as <note> or <remark> is dropped with them.
            Event::Text(_e) if matches!(parser.state, ParserState::Skip { .. }) => (),
            Event::Text(_e) => {
                return Err(Error::parse(format!(
                    "unexpected text content at byte {}",
                    reader.buffer_position()
                )))
            },
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) | Event::CData(_) => (),
        }
    }

    if parser.depth != 0 {
        return Err(Error::parse("unexpected end of document"));
    }
    parser.finish()
}

pub struct ParseOsmEtl;

impl ParseOsmEtl {
    pub fn new() -> ParseOsmEtl {
        ParseOsmEtl
    }
}

impl Default for ParseOsmEtl {
    fn default() -> Self {
        Self::new()
    }
}

impl Etl for ParseOsmEtl {
    type Input<'a> = &'a str;
    type Output = OsmMapData;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn transform(&mut self, input: &str) -> Result<OsmMapData> {
        let data = parse_osm(input)?;
        info!(etl_name = ETL_NAME, nodes = data.nodes.len(), ways = data.ways.len(); "Parsed extract");
        Ok(data)
    }
}
