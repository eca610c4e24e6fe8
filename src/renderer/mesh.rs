//! Headless surface that tessellates draw calls into vertices
//!
//! Output is in physical pixels, ready for a vertex buffer upload. Also the
//! surface used by tests and the native demo.

use glam::{Affine2, Vec2};

use super::shapes;
use super::surface::{Paint, Surface, SurfaceContext};
use super::vertex::Vertex;
use crate::error::SurfaceError;

/// Circle tessellation segments
const CIRCLE_SEGMENTS: u32 = 16;

/// Draw call counters, cumulative since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub configures: u32,
    pub clears: u32,
    pub circles: u32,
    pub polygons: u32,
    pub lines: u32,
}

/// Vertex-recording surface
#[derive(Debug, Clone)]
pub struct MeshSurface {
    attached: bool,
    context: Option<SurfaceContext>,
    /// Logical → physical, reset on every configure
    transform: Affine2,
    vertices: Vec<Vertex>,
    scratch: Vec<Vec2>,
    stats: DrawStats,
}

impl Default for MeshSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshSurface {
    pub fn new() -> Self {
        Self {
            attached: true,
            context: None,
            transform: Affine2::IDENTITY,
            vertices: Vec::new(),
            scratch: Vec::new(),
            stats: DrawStats::default(),
        }
    }

    /// A surface that refuses configuration, like a canvas without a 2D context
    pub fn detached() -> Self {
        Self {
            attached: false,
            ..Self::new()
        }
    }

    pub fn context(&self) -> Option<SurfaceContext> {
        self.context
    }

    /// Vertices of the current frame (since the last clear)
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Current frame as raw bytes for a vertex buffer
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    fn is_ready(&self) -> bool {
        self.attached && self.context.is_some()
    }
}

impl Surface for MeshSurface {
    fn configure(&mut self, context: SurfaceContext) -> Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::Detached);
        }
        self.transform = Affine2::from_scale(Vec2::splat(context.pixel_ratio));
        self.context = Some(context);
        self.vertices.clear();
        self.stats.configures += 1;
        Ok(())
    }

    fn clear(&mut self) {
        if !self.is_ready() {
            return;
        }
        self.vertices.clear();
        self.stats.clears += 1;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        if !self.is_ready() {
            return;
        }
        let center = self.transform.transform_point2(center);
        let radius = radius * self.transform.matrix2.x_axis.x;
        shapes::circle(
            &mut self.vertices,
            center,
            radius,
            paint.color.to_f32(paint.alpha),
            CIRCLE_SEGMENTS,
        );
        self.stats.circles += 1;
    }

    fn fill_polygon(&mut self, points: &[Vec2], paint: Paint) {
        if !self.is_ready() {
            return;
        }
        self.scratch.clear();
        self.scratch
            .extend(points.iter().map(|p| self.transform.transform_point2(*p)));
        shapes::polygon(&mut self.vertices, &self.scratch, paint.color.to_f32(paint.alpha));
        self.stats.polygons += 1;
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: Paint) {
        if !self.is_ready() {
            return;
        }
        let scale = self.transform.matrix2.x_axis.x;
        shapes::line(
            &mut self.vertices,
            self.transform.transform_point2(from),
            self.transform.transform_point2(to),
            width * scale,
            paint.color.to_f32(paint.alpha),
        );
        self.stats.lines += 1;
    }
}
