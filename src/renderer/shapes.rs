//! Shape generation for 2D primitives
//!
//! Local-space outlines for each entity shape, plus triangle tessellation
//! used by the mesh backend.

use glam::{Affine2, Vec2};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::vertex::Vertex;

/// Points on a star used for celebration stars
pub const STAR_POINTS: u32 = 5;

/// Local-to-surface transform for an entity at `pos` rotated by `rotation`
#[inline]
pub fn local_transform(pos: Vec2, rotation: f32) -> Affine2 {
    Affine2::from_angle_translation(rotation, pos)
}

/// Rectangle `size` wide and `size / 2` tall, centered on the origin
pub fn fleck_corners(size: f32) -> [Vec2; 4] {
    let hw = size / 2.0;
    let hh = size / 4.0;
    [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
}

/// Square `size` on a side, centered on the origin
pub fn tile_corners(size: f32) -> [Vec2; 4] {
    let h = size / 2.0;
    [
        Vec2::new(-h, -h),
        Vec2::new(h, -h),
        Vec2::new(h, h),
        Vec2::new(-h, h),
    ]
}

/// Rhombus `size` tall and `size / 2` wide, centered on the origin
pub fn diamond_corners(size: f32) -> [Vec2; 4] {
    [
        Vec2::new(0.0, -size / 2.0),
        Vec2::new(size / 4.0, 0.0),
        Vec2::new(0.0, size / 2.0),
        Vec2::new(-size / 4.0, 0.0),
    ]
}

/// Outline of an n-point star, alternating outer and inner vertices.
///
/// The first point sits straight up (-y in screen space).
pub fn star_points(points: u32, outer: f32, inner: f32) -> impl Iterator<Item = Vec2> {
    let points = points.max(2);
    let step = PI / points as f32;
    let start = PI + FRAC_PI_2;
    (0..points * 2).map(move |i| {
        let angle = start + step * i as f32;
        let r = if i % 2 == 0 { outer } else { inner };
        Vec2::new(angle.cos() * r, angle.sin() * r)
    })
}

/// Append a filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    out.reserve((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Append a polygon as a fan around its vertex centroid.
///
/// Correct for convex outlines and for stars, which are star-shaped around
/// their center.
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: [f32; 4]) {
    if points.len() < 3 {
        return;
    }
    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    out.reserve(points.len() * 3);

    for (i, p1) in points.iter().enumerate() {
        let p2 = points[(i + 1) % points.len()];
        out.push(Vertex::new(centroid.x, centroid.y, color));
        out.push(Vertex::new(p1.x, p1.y, color));
        out.push(Vertex::new(p2.x, p2.y, color));
    }
}

/// Append a line segment as a quad of the given width
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let a1 = from + perp;
    let a2 = from - perp;
    let b1 = to + perp;
    let b2 = to - perp;

    // Two triangles
    out.push(Vertex::new(a1.x, a1.y, color));
    out.push(Vertex::new(a2.x, a2.y, color));
    out.push(Vertex::new(b1.x, b1.y, color));

    out.push(Vertex::new(b1.x, b1.y, color));
    out.push(Vertex::new(a2.x, a2.y, color));
    out.push(Vertex::new(b2.x, b2.y, color));
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_star_alternates_radii() {
        let pts: Vec<Vec2> = star_points(5, 10.0, 4.0).collect();
        assert_eq!(pts.len(), 10);
        for (i, p) in pts.iter().enumerate() {
            let expected = if i % 2 == 0 { 10.0 } else { 4.0 };
            assert!((p.length() - expected).abs() < 1e-4);
        }
        // First tip points up
        assert!(pts[0].x.abs() < 1e-4);
        assert!((pts[0].y + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_star_point_count_is_parametric() {
        assert_eq!(star_points(7, 2.0, 1.0).count(), 14);
        assert_eq!(star_points(0, 2.0, 1.0).count(), 4);
    }

    #[test]
    fn test_fleck_and_diamond_extent() {
        let fleck = fleck_corners(8.0);
        assert_eq!(fleck[0], Vec2::new(-4.0, -2.0));
        assert_eq!(fleck[2], Vec2::new(4.0, 2.0));

        let diamond = diamond_corners(8.0);
        assert_eq!(diamond[0], Vec2::new(0.0, -4.0));
        assert_eq!(diamond[1], Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_local_transform_rotates_then_translates() {
        let t = local_transform(Vec2::new(10.0, 20.0), FRAC_PI_2);
        let p = t.transform_point2(Vec2::new(1.0, 0.0));
        assert!((p - Vec2::new(10.0, 21.0)).length() < 1e-5);
    }

    #[test]
    fn test_tessellation_counts() {
        let mut out = Vec::new();
        circle(&mut out, Vec2::ZERO, 3.0, WHITE, 12);
        assert_eq!(out.len(), 36);

        out.clear();
        let star: Vec<Vec2> = star_points(5, 10.0, 5.0).collect();
        polygon(&mut out, &star, WHITE);
        assert_eq!(out.len(), 30);

        out.clear();
        line(&mut out, Vec2::ZERO, Vec2::new(10.0, 0.0), 0.5, WHITE);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|v| v.position[1].abs() <= 0.25 + 1e-6));

        out.clear();
        line(&mut out, Vec2::ONE, Vec2::ONE, 1.0, WHITE);
        polygon(&mut out, &[Vec2::ZERO, Vec2::ONE], WHITE);
        assert!(out.is_empty());
    }
}
