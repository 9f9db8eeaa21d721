use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::data::render::Color;
use crate::errors::{Error, ErrorKind, Result};
use crate::etl::composite::DEFAULT_CANVAS_SIZE;
use crate::viewport::{DisplaySize, ViewportConfig, ZoomConstraints, DEFAULT_INITIAL_SCALE};

const DEFAULT_BACKGROUND: Color = Color::rgb(0xE5, 0xE3, 0xDF);

fn default_canvas_size() -> u32 {
    DEFAULT_CANVAS_SIZE as u32
}

fn default_background() -> Color {
    DEFAULT_BACKGROUND
}

fn default_initial_scale() -> f64 {
    DEFAULT_INITIAL_SCALE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserConfig {
    /// `.osm` extract, optionally `.osm.xz` compressed.
    pub data_path: String,
    pub dest_path: String,
    #[serde(default = "default_canvas_size")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_size")]
    pub canvas_height: u32,
    #[serde(default)]
    pub display: Option<DisplaySize>,
    #[serde(default = "default_background")]
    pub background_color: Color,
    #[serde(default = "default_initial_scale")]
    pub initial_scale: f64,
    #[serde(default)]
    pub zoom: ZoomConstraints,
}

impl UserConfig {
    pub fn from_json(json: &str) -> Result<UserConfig> {
        let config: UserConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::new(ErrorKind::Config, "canvas size must be positive"));
        }
        if let Some(display) = self.display {
            if !(display.width > 0.0 && display.height > 0.0) {
                return Err(Error::new(
                    ErrorKind::Config,
                    format!("display must have a positive size, got {}x{}", display.width, display.height),
                ));
            }
        }
        if !(self.initial_scale.is_finite() && self.initial_scale > 0.0) {
            return Err(Error::new(
                ErrorKind::Config,
                format!("initial_scale must be positive, got {}", self.initial_scale),
            ));
        }
        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.min <= zoom.max && zoom.factor > 1.0) {
            return Err(Error::new(
                ErrorKind::Config,
                format!("invalid zoom constraints {:?}", zoom),
            ));
        }
        Ok(())
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (f64::from(self.canvas_width), f64::from(self.canvas_height))
    }

    pub fn viewport_config(&self) -> ViewportConfig {
        let (canvas_width, canvas_height) = self.canvas_size();
        ViewportConfig {
            canvas_width,
            canvas_height,
            display: self.display,
            initial_scale: self.initial_scale,
            zoom: self.zoom,
        }
    }
}

pub fn load_user_config(path: impl AsRef<Path>) -> Result<UserConfig> {
    let file = File::open(path)?;
    let config: UserConfig = serde_json::from_reader(file)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = UserConfig::from_json(r#"{"data_path": "map.osm", "dest_path": "out"}"#).unwrap();
        assert_eq!(config.canvas_size(), (3000.0, 3000.0));
        assert_eq!(config.background_color.to_string(), "#E5E3DF");
        assert_eq!(config.zoom, ZoomConstraints::default());
        assert_eq!(config.display, None);
        assert_eq!(config.viewport_config().initial_scale, 0.5);
    }

    #[test]
    fn reads_overrides() {
        let config = UserConfig::from_json(
            r##"{
                "data_path": "map.osm.xz",
                "dest_path": "out",
                "canvas_width": 2000,
                "display": {"width": 412, "height": 780},
                "background_color": "#FFFFFF",
                "zoom": {"max": 4.0}
            }"##,
        )
        .unwrap();
        assert_eq!(config.canvas_size(), (2000.0, 3000.0));
        assert_eq!(config.display, Some(DisplaySize { width: 412.0, height: 780.0 }));
        assert_eq!(config.zoom.max, 4.0);
        assert_eq!(config.zoom.factor, 1.5);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_color = UserConfig::from_json(r#"{"data_path": "a", "dest_path": "b", "background_color": "blue"}"#);
        assert_eq!(bad_color.unwrap_err().kind, ErrorKind::Config);

        let bad_zoom = UserConfig::from_json(r#"{"data_path": "a", "dest_path": "b", "zoom": {"min": 5.0}}"#);
        assert_eq!(bad_zoom.unwrap_err().kind, ErrorKind::Config);

        let empty_display = UserConfig::from_json(
            r#"{"data_path": "a", "dest_path": "b", "display": {"width": 0, "height": 780}}"#,
        );
        assert_eq!(empty_display.unwrap_err().kind, ErrorKind::Config);

        let bad_scale = UserConfig::from_json(r#"{"data_path": "a", "dest_path": "b", "initial_scale": -1.0}"#);
        assert_eq!(bad_scale.unwrap_err().kind, ErrorKind::Config);
    }
}
