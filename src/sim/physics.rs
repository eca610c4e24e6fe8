//! Per-tick Euler integration and boundary handling
//!
//! Units are per tick, not per second: slow frames simply animate slower.

use glam::Vec2;
use rand::Rng;

use super::state::{Entity, Variant, uniform};
use crate::Bounds;
use crate::consts::*;

/// How an entity is treated when it leaves the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Re-enter from the opposite edge
    Wrap,
    /// Fade near the bottom edge, then expire
    FallAndFade,
}

/// Result of the boundary step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryOutcome {
    Alive,
    /// Slot must be recycled before it is read again
    Expired,
}

/// Integration parameters for one variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Amplitude of the random vx perturbation
    pub jitter: f32,
    /// Velocity multiplier applied after integration
    pub damping: Option<f32>,
    pub boundary: BoundaryPolicy,
}

impl PhysicsParams {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Ambient => Self {
                jitter: 0.0,
                damping: None,
                boundary: BoundaryPolicy::Wrap,
            },
            Variant::Network => Self {
                jitter: 0.0,
                damping: Some(NETWORK_DAMPING),
                boundary: BoundaryPolicy::Wrap,
            },
            Variant::Celebration => Self {
                jitter: CONFETTI_JITTER,
                damping: None,
                boundary: BoundaryPolicy::FallAndFade,
            },
        }
    }
}

/// Advance velocity, position and rotation by one tick
pub fn integrate(entity: &mut Entity, params: &PhysicsParams, rng: &mut impl Rng) {
    entity.vel.y += entity.gravity;
    if params.jitter != 0.0 {
        entity.vel.x += uniform(rng, -0.5, 0.5) * params.jitter;
    }

    entity.pos += entity.vel;

    if let Some(damping) = params.damping {
        entity.vel *= damping;
    }

    entity.rotation += entity.angular_vel;
}

/// Apply the boundary policy after integration
pub fn apply_boundary(entity: &mut Entity, policy: BoundaryPolicy, bounds: Bounds) -> BoundaryOutcome {
    match policy {
        BoundaryPolicy::Wrap => {
            wrap(entity, bounds);
            BoundaryOutcome::Alive
        }
        BoundaryPolicy::FallAndFade => fall_and_fade(entity, bounds),
    }
}

fn wrap(entity: &mut Entity, bounds: Bounds) {
    if !entity.pos.is_finite() || !entity.vel.is_finite() {
        // A runaway force; re-seat rather than propagate NaN
        entity.pos = bounds.center();
        entity.vel = Vec2::ZERO;
        return;
    }

    if entity.pos.x < 0.0 {
        entity.pos.x = bounds.width;
    } else if entity.pos.x > bounds.width {
        entity.pos.x = 0.0;
    }

    if entity.pos.y < 0.0 {
        entity.pos.y = bounds.height;
    } else if entity.pos.y > bounds.height {
        entity.pos.y = 0.0;
    }
}

fn fall_and_fade(entity: &mut Entity, bounds: Bounds) -> BoundaryOutcome {
    if !entity.pos.is_finite() {
        return BoundaryOutcome::Expired;
    }

    if entity.pos.y > bounds.height - FADE_MARGIN {
        entity.opacity = (entity.opacity - FADE_RATE).max(0.0);
    }

    if entity.opacity <= 0.0 || entity.pos.y > bounds.height + OVERSHOOT_MARGIN {
        BoundaryOutcome::Expired
    } else {
        BoundaryOutcome::Alive
    }
}
