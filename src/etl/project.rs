use crate::data::osm::Bounds;
use crate::data::render::PixelPoint;
use crate::errors::{Error, Result};

/// Equirectangular fit of a bounding box into a canvas.
///
/// The same scale is used on both axes, picked so the whole extent fits; the
/// leftover margin is split evenly on either side. North is up, so latitude
/// maps to decreasing y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    bounds: Bounds,
    canvas_width: f64,
    canvas_height: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    pub fn new(bounds: &Bounds, canvas_width: f64, canvas_height: f64) -> Result<Projection> {
        bounds
            .validate()
            .map_err(|err| Error::projection(err.message))?;
        if !(canvas_width > 0.0 && canvas_height > 0.0) {
            return Err(Error::projection(format!(
                "canvas must have a positive size, got {}x{}",
                canvas_width, canvas_height
            )));
        }

        let scale = (canvas_width / bounds.lon_range()).min(canvas_height / bounds.lat_range());
        let scaled_width = bounds.lon_range() * scale;
        let scaled_height = bounds.lat_range() * scale;

        Ok(Projection {
            bounds: *bounds,
            canvas_width,
            canvas_height,
            scale,
            offset_x: (canvas_width - scaled_width) / 2.0,
            offset_y: (canvas_height - scaled_height) / 2.0,
        })
    }

    pub fn project(&self, lat: f64, lon: f64) -> PixelPoint {
        let normalized_lat = (self.bounds.max_lat - lat) / self.bounds.lat_range();
        let normalized_lon = (lon - self.bounds.min_lon) / self.bounds.lon_range();
        let (scaled_width, scaled_height) = self.content_size();
        PixelPoint {
            x: self.offset_x + normalized_lon * scaled_width,
            y: self.offset_y + normalized_lat * scaled_height,
        }
    }

    /// Inverse of [`Projection::project`], returns `(lat, lon)`.
    pub fn unproject(&self, point: PixelPoint) -> (f64, f64) {
        let lon = self.bounds.min_lon + (point.x - self.offset_x) / self.scale;
        let lat = self.bounds.max_lat - (point.y - self.offset_y) / self.scale;
        (lat, lon)
    }

    /// Pixels per degree, identical on both axes.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Size of the projected extent inside the canvas.
    pub fn content_size(&self) -> (f64, f64) {
        (
            self.bounds.lon_range() * self.scale,
            self.bounds.lat_range() * self.scale,
        )
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }
}

/// One-off projection of a single coordinate. Prefer building a
/// [`Projection`] once when projecting many points.
pub fn project(lat: f64, lon: f64, bounds: &Bounds, canvas_width: f64, canvas_height: f64) -> Result<PixelPoint> {
    Ok(Projection::new(bounds, canvas_width, canvas_height)?.project(lat, lon))
}
