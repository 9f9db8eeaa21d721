use std::fmt::{self, Write};

use serde::{Deserialize, Serialize, Serializer};

use super::osm::OsmId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Water,
    Park,
    Building,
    Highway,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Water,
        Category::Park,
        Category::Building,
        Category::Highway,
        Category::Other,
    ];

    /// Rendered layers, back to front. `Other` is tracked but never drawn.
    pub const DRAW_ORDER: [Category; 4] = [
        Category::Water,
        Category::Park,
        Category::Building,
        Category::Highway,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Water => "water",
            Category::Park => "park",
            Category::Building => "building",
            Category::Highway => "highway",
            Category::Other => "other",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        PixelPoint { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 0xff }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(string: &str) -> Option<Color> {
        let digits = string.strip_prefix('#')?;
        if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let a = if digits.len() == 8 { byte(6)? } else { 0xff };
        Some(Color {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(serialize_color::ColorVisitor)
    }
}

mod serialize_color {
    use serde::de::{self, Visitor};

    use super::Color;

    pub struct ColorVisitor;

    impl<'de> Visitor<'de> for ColorVisitor {
        type Value = Color;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a hex color string like \"#RRGGBB\" or \"#RRGGBBAA\"")
        }

        fn visit_str<E>(self, string: &str) -> Result<Self::Value, E> where E: de::Error {
            Color::from_hex(string)
                .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Str(string), &self))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeCap {
    Butt,
    /// Round caps and round joins.
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Color,
    pub stroke_width: f64,
    pub opacity: f64,
    pub cap: StrokeCap,
}

/// Projected outline of a single way, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPath {
    pub way_id: OsmId,
    pub category: Category,
    pub points: Vec<PixelPoint>,
    pub closed: bool,
    pub style: Style,
}

impl RenderPath {
    /// Key unique across one draw list, e.g. `building-42`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.category.name(), self.way_id)
    }

    /// SVG path data: `M x y L x y ...`, with a trailing `Z` for closed paths.
    /// The repeated first point of a closed path is folded into the `Z`.
    pub fn svg_path_data(&self) -> String {
        let points = if self.closed {
            &self.points[..self.points.len().saturating_sub(1)]
        } else {
            &self.points[..]
        };
        let mut data = String::new();
        for (i, point) in points.iter().enumerate() {
            let command = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                data.push(' ');
            }
            // Writing to a String never fails.
            let _ = write!(data, "{} {} {}", command, point.x, point.y);
        }
        if self.closed {
            data.push_str(" Z");
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_round_trip() {
        let color = Color::from_hex("#FDE047").unwrap();
        assert_eq!(color, Color::rgb(0xfd, 0xe0, 0x47));
        assert_eq!(color.to_string(), "#FDE047");
        assert_eq!(Color::from_hex("#a7d3f0cc").unwrap().to_string(), "#A7D3F0CC");
    }

    #[test]
    fn color_rejects_garbage() {
        assert_eq!(Color::from_hex("FDE047"), None);
        assert_eq!(Color::from_hex("#FDE04"), None);
        assert_eq!(Color::from_hex("#GGGGGG"), None);
    }

    #[test]
    fn color_deserializes_from_json_string() {
        let color: Color = serde_json::from_str("\"#E5E3DF\"").unwrap();
        assert_eq!(color, Color::rgb(0xe5, 0xe3, 0xdf));
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }

    #[test]
    fn category_and_color_serialize_for_the_host() {
        assert_eq!(serde_json::to_string(&Category::Building).unwrap(), "\"building\"");
        assert_eq!(serde_json::to_string(&Color::rgb(0xfd, 0xe0, 0x47)).unwrap(), "\"#FDE047\"");
    }

    #[test]
    fn svg_path_data_closes_with_z() {
        let path = RenderPath {
            way_id: "7".to_string(),
            category: Category::Building,
            points: vec![
                PixelPoint::new(0.0, 0.0),
                PixelPoint::new(10.0, 0.0),
                PixelPoint::new(10.0, 5.0),
                PixelPoint::new(0.0, 0.0),
            ],
            closed: true,
            style: Style {
                fill: None,
                stroke: Color::rgb(0, 0, 0),
                stroke_width: 1.0,
                opacity: 1.0,
                cap: StrokeCap::Butt,
            },
        };
        assert_eq!(path.svg_path_data(), "M 0 0 L 10 0 L 10 5 Z");
        assert_eq!(path.key(), "building-7");
    }
}
