use log::{info, warn};

use crate::data::render::RenderPath;
use crate::data::OsmMapData;
use crate::errors::Result;
use crate::etl::categorize::{CategorizeEtl, CategorizedWays};
use crate::etl::composite::{CompositeEtl, DEFAULT_CANVAS_SIZE};
use crate::etl::parse_osm::ParseOsmEtl;
use crate::etl::Etl;

/// Everything one data load produces. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedMap {
    /// `None` for the empty render set adopted after a failed load.
    pub data: Option<OsmMapData>,
    pub categorized: CategorizedWays,
    pub paths: Vec<RenderPath>,
}

impl RenderedMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Runs parse, categorize and composite over one raw extract.
pub struct MapPipeline {
    parse: ParseOsmEtl,
    categorize: CategorizeEtl,
    composite: CompositeEtl,
}

impl MapPipeline {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        MapPipeline {
            parse: ParseOsmEtl::new(),
            categorize: CategorizeEtl::new(),
            composite: CompositeEtl::new(canvas_width, canvas_height),
        }
    }

    pub fn run(&mut self, raw_text: &str) -> Result<RenderedMap> {
        let data = self.parse.process(raw_text)?;
        let categorized = self.categorize.process(data.ways.as_slice())?;
        let paths = self.composite.process((&data, &categorized))?;
        Ok(RenderedMap {
            data: Some(data),
            categorized,
            paths,
        })
    }
}

impl Default for MapPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Adopted,
    /// A later load was started; the result was discarded.
    Stale,
}

/// Holds the render set currently shown and decides which load results to
/// adopt. Only the most recently started load may replace it, so a slow load
/// that finishes after a newer one is dropped.
#[derive(Debug, Default)]
pub struct MapLoader {
    current: RenderedMap,
    latest_generation: u64,
    adopted_generation: Option<u64>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_generation += 1;
        LoadTicket {
            generation: self.latest_generation,
        }
    }

    /// Adopts `result` if `ticket` belongs to the latest load. A failed latest
    /// load replaces the current map with the empty render set.
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<RenderedMap>) -> LoadOutcome {
        if ticket.generation != self.latest_generation {
            warn!(generation = ticket.generation, latest = self.latest_generation; "Discarding stale map load");
            return LoadOutcome::Stale;
        }
        self.current = match result {
            Ok(map) => {
                info!(generation = ticket.generation, paths = map.paths.len(); "Adopted map load");
                map
            },
            Err(err) => {
                warn!(generation = ticket.generation, err = err.message.as_str(); "Map load failed, falling back to an empty map");
                RenderedMap::empty()
            },
        };
        self.adopted_generation = Some(ticket.generation);
        LoadOutcome::Adopted
    }

    /// Starts a load and runs `pipeline` on `raw_text` right away.
    pub fn load(&mut self, pipeline: &mut MapPipeline, raw_text: &str) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = pipeline.run(raw_text);
        self.complete(ticket, result)
    }

    pub fn current(&self) -> &RenderedMap {
        &self.current
    }

    pub fn adopted_generation(&self) -> Option<u64> {
        self.adopted_generation
    }
}
