//! Pan/zoom state of the map view.
//!
//! The composited map lives on a fixed canvas. The presentation layer shows it
//! through a display area using `translate(offset) scale(scale)`; this module
//! owns that transform and updates it from pointer and zoom input. Screen
//! positions are in display pixels, map positions in canvas pixels.

use log::debug;
use serde::Deserialize;

use crate::data::render::PixelPoint;
use crate::etl::composite::DEFAULT_CANVAS_SIZE;

pub const DEFAULT_INITIAL_SCALE: f64 = 0.5;

/// Display size assumed until the real one has been measured.
pub const FALLBACK_DISPLAY_SIZE: DisplaySize = DisplaySize {
    width: 400.0,
    height: 600.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConstraints {
    pub factor: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomConstraints {
    fn default() -> Self {
        ZoomConstraints {
            factor: 1.5,
            min: 0.2,
            max: 3.0,
        }
    }
}

impl ZoomConstraints {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    pub fn next_scale(&self, scale: f64, direction: ZoomDirection) -> f64 {
        match direction {
            ZoomDirection::In => self.clamp(scale * self.factor),
            ZoomDirection::Out => self.clamp(scale / self.factor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Where a selected point should land on screen, and at which scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecenterOptions {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for RecenterOptions {
    fn default() -> Self {
        RecenterOptions {
            offset_x: 200.0,
            offset_y: 400.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl ViewportState {
    pub fn canvas_to_screen(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(
            self.offset_x + point.x * self.scale,
            self.offset_y + point.y * self.scale,
        )
    }

    pub fn screen_to_canvas(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(
            (point.x - self.offset_x) / self.scale,
            (point.y - self.offset_y) / self.scale,
        )
    }

    /// Counter-scale for overlays that keep a fixed on-screen size.
    pub fn overlay_scale(&self) -> f64 {
        1.0 / self.scale
    }

    /// The transform as a CSS `transform` value.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.offset_x, self.offset_y, self.scale
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub display: Option<DisplaySize>,
    pub initial_scale: f64,
    pub zoom: ZoomConstraints,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            canvas_width: DEFAULT_CANVAS_SIZE,
            canvas_height: DEFAULT_CANVAS_SIZE,
            display: None,
            initial_scale: DEFAULT_INITIAL_SCALE,
            zoom: ZoomConstraints::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    /// `anchor` is the pointer position relative to the offset at drag start.
    Dragging { anchor: PixelPoint },
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
    drag: DragState,
    /// Set once the user has moved the view; display measurements stop
    /// recentering it after that.
    interacted: bool,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let state = Self::default_state(&config);
        ViewportController {
            config,
            state,
            drag: DragState::Idle,
            interacted: false,
        }
    }

    fn display(config: &ViewportConfig) -> DisplaySize {
        config.display.unwrap_or(FALLBACK_DISPLAY_SIZE)
    }

    /// Canvas midpoint centered in the display at the initial scale.
    fn default_state(config: &ViewportConfig) -> ViewportState {
        let scale = config.zoom.clamp(config.initial_scale);
        let display_center = Self::display(config).center();
        ViewportState {
            offset_x: display_center.x - config.canvas_width / 2.0 * scale,
            offset_y: display_center.y - config.canvas_height / 2.0 * scale,
            scale,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn display_size(&self) -> DisplaySize {
        Self::display(&self.config)
    }

    /// Records the measured display size. Until the view has been moved this
    /// also recenters it for the new size.
    pub fn set_display_size(&mut self, display: DisplaySize) {
        if !(display.width > 0.0 && display.height > 0.0) {
            return;
        }
        self.config.display = Some(display);
        if !self.interacted {
            self.state = Self::default_state(&self.config);
        }
    }

    pub fn reset(&mut self) {
        self.state = Self::default_state(&self.config);
        self.drag = DragState::Idle;
        self.interacted = false;
    }

    pub fn begin_drag(&mut self, pointer: PixelPoint) {
        self.drag = DragState::Dragging {
            anchor: PixelPoint::new(pointer.x - self.state.offset_x, pointer.y - self.state.offset_y),
        };
    }

    /// Moves the view with the pointer. Ignored unless a drag is in progress.
    pub fn drag_to(&mut self, pointer: PixelPoint) {
        if let DragState::Dragging { anchor } = self.drag {
            self.state.offset_x = pointer.x - anchor.x;
            self.state.offset_y = pointer.y - anchor.y;
            self.interacted = true;
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn zoom(&mut self, direction: ZoomDirection) {
        let constraints = self.config.zoom;
        self.zoom_with(direction, constraints);
    }

    /// Zooms about the display center: the map point under the center stays
    /// under the center.
    pub fn zoom_with(&mut self, direction: ZoomDirection, constraints: ZoomConstraints) {
        let center = self.display_size().center();
        let anchor = self.state.screen_to_canvas(center);
        let scale = constraints.next_scale(self.state.scale, direction);

        self.state = ViewportState {
            offset_x: center.x - anchor.x * scale,
            offset_y: center.y - anchor.y * scale,
            scale,
        };
        self.interacted = true;
        debug!(scale = scale; "Zoomed viewport");
    }

    /// Jumps so that the canvas `point` shows at `(options.offset_x,
    /// options.offset_y)` on screen. `options.scale` is clamped to the zoom
    /// constraints like any other scale change. Cancels any drag in progress.
    pub fn recenter_on_point(&mut self, point: PixelPoint, options: RecenterOptions) {
        let scale = self.config.zoom.clamp(options.scale);
        self.state = ViewportState {
            offset_x: options.offset_x - point.x * scale,
            offset_y: options.offset_y - point.y * scale,
            scale,
        };
        self.drag = DragState::Idle;
        self.interacted = true;
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}
