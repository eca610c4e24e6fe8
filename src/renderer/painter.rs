//! Stateless frame painter
//!
//! Consumes the entity slice and link set and issues draw calls. Holds no
//! per-entity state between frames.

use glam::Vec2;

use super::shapes::{self, STAR_POINTS};
use super::surface::{Paint, Surface};
use crate::consts::LINK_WIDTH;
use crate::settings::Color;
use crate::sim::{Entity, Link, ShapeKind};

/// Frame-wide paint parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStyle {
    pub link_color: Color,
    pub link_width: f32,
    /// Multiplies every alpha (overlay fade in/out)
    pub global_alpha: f32,
}

impl FrameStyle {
    pub fn new(link_color: Color) -> Self {
        Self {
            link_color,
            link_width: LINK_WIDTH,
            global_alpha: 1.0,
        }
    }

    pub fn with_global_alpha(mut self, alpha: f32) -> Self {
        self.global_alpha = alpha.clamp(0.0, 1.0);
        self
    }
}

/// Clear, draw every active entity, then the link set
pub fn draw_frame<S: Surface + ?Sized>(
    surface: &mut S,
    entities: &[Entity],
    links: &[Link],
    style: &FrameStyle,
) {
    draw_layered_frame(surface, &[], entities, links, style);
}

/// `draw_frame` with a backdrop layer painted underneath.
///
/// Link indices refer to `entities`, never to `backdrop`.
pub fn draw_layered_frame<S: Surface + ?Sized>(
    surface: &mut S,
    backdrop: &[Entity],
    entities: &[Entity],
    links: &[Link],
    style: &FrameStyle,
) {
    surface.clear();
    if style.global_alpha <= 0.0 {
        return;
    }

    let mut outline: Vec<Vec2> = Vec::with_capacity(STAR_POINTS as usize * 2);
    for entity in backdrop.iter().chain(entities).filter(|e| e.is_active()) {
        draw_entity(surface, entity, style.global_alpha, &mut outline);
    }

    for link in links {
        let (Some(a), Some(b)) = (entities.get(link.a), entities.get(link.b)) else {
            continue;
        };
        surface.stroke_line(
            a.pos,
            b.pos,
            style.link_width,
            Paint::new(style.link_color, link.alpha * style.global_alpha),
        );
    }
}

/// Draw one entity using its shape routine; `outline` is scratch space
pub fn draw_entity<S: Surface + ?Sized>(
    surface: &mut S,
    entity: &Entity,
    global_alpha: f32,
    outline: &mut Vec<Vec2>,
) {
    let paint = Paint::new(entity.color, entity.opacity.clamp(0.0, 1.0) * global_alpha);
    if paint.alpha <= 0.0 {
        return;
    }

    let transform = shapes::local_transform(entity.pos, entity.rotation);
    outline.clear();
    match entity.shape {
        ShapeKind::Dot => {
            surface.fill_circle(entity.pos, entity.size, paint);
            return;
        }
        ShapeKind::Fleck => outline.extend(shapes::fleck_corners(entity.size)),
        ShapeKind::Tile => outline.extend(shapes::tile_corners(entity.size)),
        ShapeKind::Diamond => outline.extend(shapes::diamond_corners(entity.size)),
        ShapeKind::Star => outline.extend(shapes::star_points(
            STAR_POINTS,
            entity.size / 2.0,
            entity.size / 4.0,
        )),
    }

    for p in outline.iter_mut() {
        *p = transform.transform_point2(*p);
    }
    surface.fill_polygon(outline, paint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bounds;
    use crate::renderer::mesh::MeshSurface;
    use crate::renderer::surface::SurfaceContext;

    fn entity(shape: ShapeKind, opacity: f32) -> Entity {
        Entity {
            pos: Vec2::new(50.0, 50.0),
            vel: Vec2::ZERO,
            size: 6.0,
            color: Color::rgb(255, 215, 0),
            rotation: 0.3,
            angular_vel: 0.0,
            opacity,
            gravity: 0.0,
            shape,
        }
    }

    fn surface() -> MeshSurface {
        let mut s = MeshSurface::new();
        s.configure(SurfaceContext::new(Bounds::new(100.0, 100.0), 1.0)).unwrap();
        s
    }

    #[test]
    fn test_one_call_per_active_entity() {
        let mut s = surface();
        let entities = [
            entity(ShapeKind::Dot, 0.5),
            entity(ShapeKind::Fleck, 1.0),
            entity(ShapeKind::Diamond, 1.0),
            entity(ShapeKind::Star, 1.0),
            entity(ShapeKind::Tile, 1.0),
            entity(ShapeKind::Star, 0.0),
        ];
        draw_frame(&mut s, &entities, &[], &FrameStyle::new(Color::rgb(0, 0, 0)));

        let stats = s.stats();
        assert_eq!(stats.clears, 1);
        assert_eq!(stats.circles, 1);
        assert_eq!(stats.polygons, 4);
        assert_eq!(stats.lines, 0);
    }

    #[test]
    fn test_links_drawn_after_entities_with_alpha() {
        let mut s = surface();
        let entities = [entity(ShapeKind::Dot, 1.0), entity(ShapeKind::Dot, 1.0)];
        let links = [Link { a: 0, b: 1, alpha: 0.15 }, Link { a: 0, b: 9, alpha: 0.1 }];
        draw_frame(&mut s, &entities, &links, &FrameStyle::new(Color::rgb(0, 0, 0)));

        assert_eq!(s.stats().lines, 1);
        let last = s.vertices().last().unwrap();
        assert!((last.color[3] - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_backdrop_painted_first() {
        let mut s = surface();
        let mut star = entity(ShapeKind::Star, 1.0);
        star.color = Color::rgb(255, 0, 0);
        let dot = entity(ShapeKind::Dot, 1.0);
        let links = [Link { a: 0, b: 1, alpha: 0.2 }];
        draw_layered_frame(&mut s, &[star], &[dot], &links, &FrameStyle::new(Color::rgb(0, 0, 0)));

        let stats = s.stats();
        assert_eq!((stats.polygons, stats.circles), (1, 1));
        // The only link points past the single foreground entity
        assert_eq!(stats.lines, 0);
        assert_eq!(s.vertices()[0].color[0], 1.0);
        assert_ne!(s.vertices().last().unwrap().color[0], 1.0);
    }

    #[test]
    fn test_global_alpha_scales_paint() {
        let mut s = surface();
        let entities = [entity(ShapeKind::Dot, 0.5)];
        let style = FrameStyle::new(Color::rgb(0, 0, 0)).with_global_alpha(0.5);
        draw_frame(&mut s, &entities, &[], &style);
        assert!(s.vertices().iter().all(|v| (v.color[3] - 0.25).abs() < 1e-6));

        let hidden = style.with_global_alpha(0.0);
        draw_frame(&mut s, &entities, &[], &hidden);
        assert!(s.vertices().is_empty());
    }

    #[test]
    fn test_dot_and_tile_share_outer_extent() {
        let mut s = surface();
        let mut dot = entity(ShapeKind::Dot, 1.0);
        dot.size = 3.0;
        draw_frame(&mut s, &[dot], &[], &FrameStyle::new(Color::rgb(0, 0, 0)));
        let reach = s
            .vertices()
            .iter()
            .map(|v| Vec2::from(v.position).distance(dot.pos))
            .fold(0.0f32, f32::max);
        assert!((reach - 3.0).abs() < 1e-4);

        let mut tile = entity(ShapeKind::Tile, 1.0);
        tile.size = 6.0;
        tile.rotation = 0.0;
        draw_frame(&mut s, &[tile], &[], &FrameStyle::new(Color::rgb(0, 0, 0)));
        for v in s.vertices() {
            let d = Vec2::from(v.position) - tile.pos;
            assert!(d.x.abs() <= 3.0 + 1e-4 && d.y.abs() <= 3.0 + 1e-4);
        }
        let width = s.vertices().iter().map(|v| v.position[0]).fold(f32::MIN, f32::max)
            - s.vertices().iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        let height = s.vertices().iter().map(|v| v.position[1]).fold(f32::MIN, f32::max)
            - s.vertices().iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((width - 6.0).abs() < 1e-4 && (height - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_star_rotated_around_position() {
        let mut s = surface();
        let star = entity(ShapeKind::Star, 1.0);
        draw_frame(&mut s, &[star], &[], &FrameStyle::new(Color::rgb(0, 0, 0)));
        // Every vertex lies within the outer radius of the entity center
        assert!(s.vertices().iter().all(|v| {
            Vec2::from(v.position).distance(star.pos) <= star.size / 2.0 + 1e-4
        }));
    }
}
