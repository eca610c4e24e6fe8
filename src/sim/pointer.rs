//! Pointer repulsion
//!
//! Tracks the latest pointer position in surface-local coordinates and turns
//! it into an additive velocity impulse for entities inside the radius.

use glam::Vec2;

use crate::consts::{POINTER_RADIUS, POINTER_STRENGTH};

/// Localized repulsion source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerForce {
    pub radius: f32,
    pub strength: f32,
    position: Option<Vec2>,
}

impl Default for PointerForce {
    fn default() -> Self {
        Self::new(POINTER_RADIUS, POINTER_STRENGTH)
    }
}

impl PointerForce {
    pub fn new(radius: f32, strength: f32) -> Self {
        Self {
            radius,
            strength,
            position: None,
        }
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn set_position(&mut self, pos: Vec2) {
        if pos.is_finite() {
            self.position = Some(pos);
        }
    }

    /// Pointer left the surface
    pub fn clear(&mut self) {
        self.position = None;
    }

    /// Velocity to add to an entity at `entity_pos` this tick.
    ///
    /// Scales linearly from `strength` at the pointer to zero at `radius`,
    /// directed from the pointer toward the entity.
    pub fn impulse(&self, entity_pos: Vec2) -> Vec2 {
        let Some(pointer) = self.position else {
            return Vec2::ZERO;
        };
        if self.radius <= 0.0 {
            return Vec2::ZERO;
        }

        let offset = entity_pos - pointer;
        let distance = offset.length();
        // At d == 0 there is no direction to push along
        if distance >= self.radius || distance <= f32::EPSILON {
            return Vec2::ZERO;
        }

        let falloff = (self.radius - distance) / self.radius;
        offset / distance * falloff * self.strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pointer_no_force() {
        let force = PointerForce::default();
        assert_eq!(force.impulse(Vec2::new(10.0, 10.0)), Vec2::ZERO);
    }

    #[test]
    fn test_pushes_away_with_linear_falloff() {
        let mut force = PointerForce::default();
        force.set_position(Vec2::new(100.0, 100.0));

        let impulse = force.impulse(Vec2::new(150.0, 100.0));
        // (100 - 50) / 100 * 0.5 along +x
        assert!((impulse.x - 0.25).abs() < 1e-6);
        assert!(impulse.y.abs() < 1e-6);

        let near = force.impulse(Vec2::new(100.0, 90.0));
        assert!(near.y < 0.0);
        assert!(near.length() > impulse.length());
    }

    #[test]
    fn test_outside_radius_unaffected() {
        let mut force = PointerForce::default();
        force.set_position(Vec2::ZERO);
        assert_eq!(force.impulse(Vec2::new(100.0, 0.0)), Vec2::ZERO);
        assert_eq!(force.impulse(Vec2::new(300.0, 40.0)), Vec2::ZERO);
    }

    #[test]
    fn test_coincident_entity_is_finite() {
        let mut force = PointerForce::default();
        force.set_position(Vec2::new(5.0, 5.0));
        let impulse = force.impulse(Vec2::new(5.0, 5.0));
        assert!(impulse.is_finite());
        assert_eq!(impulse, Vec2::ZERO);
    }

    #[test]
    fn test_clear_and_reject_nan() {
        let mut force = PointerForce::default();
        force.set_position(Vec2::new(1.0, 1.0));
        force.set_position(Vec2::new(f32::NAN, 0.0));
        assert_eq!(force.position(), Some(Vec2::new(1.0, 1.0)));
        force.clear();
        assert_eq!(force.position(), None);
    }
}
