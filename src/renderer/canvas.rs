//! Canvas2D surface (browser only)

use glam::Vec2;
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::{Paint, Surface, SurfaceContext};
use crate::Bounds;
use crate::error::SurfaceError;
use crate::settings::Color;

fn css_color(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        color.r,
        color.g,
        color.b,
        color.a as f32 / 255.0
    )
}

/// A `<canvas>` element and its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    logical: Bounds,
}

impl CanvasSurface {
    /// Look up a canvas by element id and acquire its 2D context
    pub fn from_element_id(id: &str) -> Result<Self, SurfaceError> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .ok_or_else(|| SurfaceError::Unavailable(id.to_string()))?;
        Self::from_canvas(canvas)
    }

    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(SurfaceError::ContextUnavailable)?;
        Ok(Self {
            canvas,
            ctx,
            logical: Bounds::new(0.0, 0.0),
        })
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Laid-out CSS size of the canvas
    pub fn css_size(&self) -> Bounds {
        let rect = self.canvas.get_bounding_client_rect();
        Bounds::new(rect.width() as f32, rect.height() as f32)
    }
}

impl Surface for CanvasSurface {
    fn configure(&mut self, context: SurfaceContext) -> Result<(), SurfaceError> {
        let (w, h) = context.buffer_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let r = context.pixel_ratio as f64;
        // Reset rather than scale so repeated resizes never compound
        self.ctx
            .set_transform(r, 0.0, 0.0, r, 0.0, 0.0)
            .map_err(|_| SurfaceError::ContextUnavailable)?;
        self.logical = context.logical;
        Ok(())
    }

    fn clear(&mut self) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.logical.width as f64,
            self.logical.height as f64,
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_err()
        {
            return;
        }
        self.ctx.set_global_alpha(paint.alpha as f64);
        self.ctx.set_fill_style_str(&css_color(paint.color));
        self.ctx.fill();
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: Paint) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.set_global_alpha(paint.alpha as f64);
        self.ctx.set_fill_style_str(&css_color(paint.color));
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: Paint) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_line_width(width as f64);
        self.ctx.set_global_alpha(paint.alpha as f64);
        self.ctx.set_stroke_style_str(&css_color(paint.color));
        self.ctx.stroke();
    }
}
