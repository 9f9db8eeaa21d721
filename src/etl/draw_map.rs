use std::path::Path;

use log::info;
use raqote::{DrawOptions, DrawTarget, LineCap, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle, Transform};

use crate::data::render::{Color, RenderPath, StrokeCap};
use crate::errors::Result;
use crate::etl::Etl;
use crate::viewport::{DisplaySize, ViewportState};

pub const ETL_NAME: &str = "draw_map";

/// Rasterises a draw list. Without a viewport the target is the whole canvas;
/// with one it is the display area, seen through the pan/zoom transform.
pub struct DrawMapEtl {
    width: i32,
    height: i32,
    background: Color,
    view: Option<ViewportState>,
}

fn solid(color: Color) -> Source<'static> {
    Source::Solid(SolidSource::from_unpremultiplied_argb(
        color.a, color.r, color.g, color.b,
    ))
}

fn stroke(width: f64, cap: StrokeCap) -> StrokeStyle {
    let (cap, join) = match cap {
        StrokeCap::Round => (LineCap::Round, LineJoin::Round),
        StrokeCap::Butt => (LineCap::Butt, LineJoin::Miter),
    };
    StrokeStyle {
        cap,
        join,
        width: width as f32,
        miter_limit: 10.0,
        dash_array: Vec::new(),
        dash_offset: 0.0,
    }
}

impl DrawMapEtl {
    pub fn for_canvas(canvas_width: u32, canvas_height: u32, background: Color) -> Result<DrawMapEtl> {
        Ok(DrawMapEtl {
            width: canvas_width.try_into()?,
            height: canvas_height.try_into()?,
            background,
            view: None,
        })
    }

    pub fn for_viewport(display: DisplaySize, view: ViewportState, background: Color) -> Result<DrawMapEtl> {
        if !(display.width >= 1.0 && display.height >= 1.0) {
            return Err(format!("cannot draw a {}x{} viewport", display.width, display.height).into());
        }
        Ok(DrawMapEtl {
            width: display.width.round() as i32,
            height: display.height.round() as i32,
            background,
            view: Some(view),
        })
    }

    fn draw_render_path(&self, dt: &mut DrawTarget, render_path: &RenderPath) {
        if render_path.points.len() < 2 {
            return;
        }
        let mut pb = PathBuilder::new();
        let first = render_path.points[0];
        pb.move_to(first.x as f32, first.y as f32);
        for point in &render_path.points[1..] {
            pb.line_to(point.x as f32, point.y as f32);
        }
        if render_path.closed {
            pb.close();
        }
        let raqote_path = pb.finish();

        let mut draw_options = DrawOptions::new();
        draw_options.alpha = render_path.style.opacity as f32;

        if let Some(fill) = render_path.style.fill {
            dt.fill(&raqote_path, &solid(fill), &draw_options);
        }
        dt.stroke(
            &raqote_path,
            &solid(render_path.style.stroke),
            &stroke(render_path.style.stroke_width, render_path.style.cap),
            &draw_options,
        );
    }

    pub fn write_png(&self, dt: &DrawTarget, path: impl AsRef<Path>) -> Result<()> {
        dt.write_png(path)
            .map_err(|_| "Couldn't write png. (encoding error)".into())
    }
}

impl Etl for DrawMapEtl {
    type Input<'a> = &'a [RenderPath];
    type Output = DrawTarget;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn transform(&mut self, input: &[RenderPath]) -> Result<DrawTarget> {
        let mut dt = DrawTarget::new(self.width, self.height);
        let c = self.background;
        dt.clear(SolidSource::from_unpremultiplied_argb(c.a, c.r, c.g, c.b));

        if let Some(view) = self.view {
            let scale = view.scale as f32;
            dt.set_transform(&Transform::new(
                scale, 0.0,
                0.0, scale,
                view.offset_x as f32, view.offset_y as f32,
            ));
        }

        for render_path in input {
            self.draw_render_path(&mut dt, render_path);
        }
        info!(etl_name = ETL_NAME, paths = input.len(), width = self.width, height = self.height; "Drew map");
        Ok(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::render::{Category, PixelPoint, Style};

    fn square(category: Category, fill: Color) -> RenderPath {
        RenderPath {
            way_id: "1".to_string(),
            category,
            points: vec![
                PixelPoint::new(2.0, 2.0),
                PixelPoint::new(8.0, 2.0),
                PixelPoint::new(8.0, 8.0),
                PixelPoint::new(2.0, 8.0),
                PixelPoint::new(2.0, 2.0),
            ],
            closed: true,
            style: Style {
                fill: Some(fill),
                stroke: fill,
                stroke_width: 1.0,
                opacity: 1.0,
                cap: StrokeCap::Butt,
            },
        }
    }

    fn pixel(dt: &DrawTarget, x: i32, y: i32) -> u32 {
        dt.get_data()[(y * dt.width() + x) as usize]
    }

    #[test]
    fn fills_closed_paths_over_background() {
        let mut etl = DrawMapEtl::for_canvas(10, 10, Color::rgb(0xff, 0xff, 0xff)).unwrap();
        let paths = vec![square(Category::Building, Color::rgb(0xff, 0, 0))];
        let dt = etl.transform(&paths[..]).unwrap();
        assert_eq!(pixel(&dt, 5, 5), 0xffff0000);
        assert_eq!(pixel(&dt, 0, 0), 0xffffffff);
    }

    #[test]
    fn viewport_transform_is_applied() {
        let view = ViewportState { offset_x: 10.0, offset_y: 0.0, scale: 1.0 };
        let display = DisplaySize { width: 20.0, height: 10.0 };
        let mut etl = DrawMapEtl::for_viewport(display, view, Color::rgb(0xff, 0xff, 0xff)).unwrap();
        let paths = vec![square(Category::Park, Color::rgb(0, 0, 0xff))];
        let dt = etl.transform(&paths[..]).unwrap();
        assert_eq!(pixel(&dt, 15, 5), 0xff0000ff);
        assert_eq!(pixel(&dt, 5, 5), 0xffffffff);
    }

    #[test]
    fn rejects_empty_viewport() {
        let view = ViewportState { offset_x: 0.0, offset_y: 0.0, scale: 1.0 };
        let display = DisplaySize { width: 0.0, height: 10.0 };
        assert!(DrawMapEtl::for_viewport(display, view, Color::rgb(0, 0, 0)).is_err());
    }
}
