use std::collections::HashMap;

use crate::errors::{Error, Result};

pub type OsmId = String;
pub type Tags = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    pub lat: f64,
    pub lon: f64,
    pub tags: Tags,
}

/// Ordered outline of a line or polygon. `node_refs` may point at nodes that
/// are not part of the extract.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Way {
    pub id: OsmId,
    pub node_refs: Vec<OsmId>,
    pub tags: Tags,
}

impl Way {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Rectangular geographic extent of a loaded extract. Always has a positive
/// latitude and longitude range when built through [`Bounds::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Result<Bounds> {
        let bounds = Bounds {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        let all_finite = [self.min_lat, self.min_lon, self.max_lat, self.max_lon]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::parse("bounds contain a non-finite value"));
        }
        if self.lat_range() <= 0.0 || self.lon_range() <= 0.0 {
            return Err(Error::parse(format!(
                "degenerate bounds: lat range {}, lon range {}",
                self.lat_range(),
                self.lon_range()
            )));
        }
        Ok(())
    }

    pub fn lat_range(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_range(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}
