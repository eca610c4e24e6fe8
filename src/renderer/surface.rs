//! Raster surface abstraction
//!
//! Everything the painter needs from a 2D target. Coordinates are logical
//! (CSS pixels); backends apply the device pixel ratio once in `configure`.

use glam::Vec2;

use crate::Bounds;
use crate::error::SurfaceError;
use crate::settings::Color;

/// Size and pixel density of the current drawing buffer.
///
/// Only valid until the next resize or unmount; schedulers re-acquire it
/// rather than caching it across those events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContext {
    pub logical: Bounds,
    pub pixel_ratio: f32,
}

impl SurfaceContext {
    pub fn new(logical: Bounds, pixel_ratio: f32) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            logical,
            pixel_ratio,
        }
    }

    /// Backing buffer dimensions in physical pixels
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            (self.logical.width * self.pixel_ratio).round().max(0.0) as u32,
            (self.logical.height * self.pixel_ratio).round().max(0.0) as u32,
        )
    }
}

/// Fill or stroke style for one draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    /// Multiplies the color's own alpha, clamped to [0, 1]
    pub alpha: f32,
}

impl Paint {
    pub fn new(color: Color, alpha: f32) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

/// A 2D raster target
pub trait Surface {
    /// Resize the backing buffer and reset the pixel-ratio transform
    fn configure(&mut self, context: SurfaceContext) -> Result<(), SurfaceError>;

    /// Erase the whole logical area
    fn clear(&mut self);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint);

    /// Fill a closed polygon given in logical coordinates
    fn fill_polygon(&mut self, points: &[Vec2], paint: Paint);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: Paint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_scales_with_ratio() {
        let ctx = SurfaceContext::new(Bounds::new(400.0, 300.0), 2.0);
        assert_eq!(ctx.buffer_size(), (800, 600));

        let ctx = SurfaceContext::new(Bounds::new(101.0, 33.0), 1.5);
        assert_eq!(ctx.buffer_size(), (152, 50));
    }

    #[test]
    fn test_invalid_ratio_falls_back_to_one() {
        assert_eq!(SurfaceContext::new(Bounds::new(1.0, 1.0), 0.0).pixel_ratio, 1.0);
        assert_eq!(SurfaceContext::new(Bounds::new(1.0, 1.0), f32::NAN).pixel_ratio, 1.0);
    }

    #[test]
    fn test_paint_clamps_alpha() {
        assert_eq!(Paint::new(Color::rgb(0, 0, 0), 1.7).alpha, 1.0);
        assert_eq!(Paint::new(Color::rgb(0, 0, 0), -0.2).alpha, 0.0);
    }
}
