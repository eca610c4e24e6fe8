//! Per-tick simulation step
//!
//! For every slot: pointer impulse, integration, boundary policy, and
//! in-place recycle of expired slots. Link analysis and painting happen
//! afterwards, in the scheduler.

use super::physics::{BoundaryOutcome, PhysicsParams, apply_boundary, integrate};
use super::pointer::PointerForce;
use super::state::EntityStore;
use crate::Bounds;

/// Inputs sampled by the scheduler before a tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Present only when pointer interaction is enabled and mounted
    pub pointer: Option<PointerForce>,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Slots respawned this tick
    pub recycled: usize,
}

/// Advance every entity in the store by one tick
pub fn tick(store: &mut EntityStore, input: &TickInput, bounds: Bounds) -> TickReport {
    let params = PhysicsParams::for_variant(store.variant());
    let mut report = TickReport::default();

    for index in 0..store.len() {
        let outcome = {
            let (entity, rng) = store.slot_and_rng(index);
            if let Some(pointer) = &input.pointer {
                entity.vel += pointer.impulse(entity.pos);
            }
            integrate(entity, &params, rng);
            apply_boundary(entity, params.boundary, bounds)
        };

        if outcome == BoundaryOutcome::Expired {
            store.recycle(index, bounds);
            report.recycled += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::palettes;
    use crate::sim::state::Variant;
    use glam::Vec2;

    const BOUNDS: Bounds = Bounds::new(640.0, 480.0);

    #[test]
    fn test_tick_keeps_store_length() {
        let mut store =
            EntityStore::initialize(Variant::Celebration, 80, &palettes::CELEBRATION, BOUNDS, 5);
        let input = TickInput::default();
        let mut recycled = 0;
        for _ in 0..600 {
            recycled += tick(&mut store, &input, BOUNDS).recycled;
            assert_eq!(store.len(), 80);
        }
        // Confetti falls off the bottom well within ten seconds
        assert!(recycled > 0);
        assert_eq!(store.recycled_total(), recycled as u64);
    }

    #[test]
    fn test_pointer_force_applied_in_tick() {
        let mut store = EntityStore::initialize(Variant::Network, 1, &palettes::SLATE, BOUNDS, 2);
        {
            let e = &mut store.entities_mut()[0];
            e.pos = Vec2::new(300.0, 200.0);
            e.vel = Vec2::ZERO;
        }
        let mut pointer = PointerForce::default();
        pointer.set_position(Vec2::new(250.0, 200.0));
        let input = TickInput {
            pointer: Some(pointer),
        };

        tick(&mut store, &input, BOUNDS);
        let e = store.get(0).unwrap();
        // Pushed right: impulse 0.25, moved by it, then damped
        assert!((e.pos.x - 300.25).abs() < 1e-4);
        assert!((e.vel.x - 0.25 * NETWORK_DAMPING).abs() < 1e-6);
    }

    #[test]
    fn test_celebration_opacity_never_increases_while_fading() {
        let mut store =
            EntityStore::initialize(Variant::Celebration, 1, &palettes::CELEBRATION, BOUNDS, 8);
        {
            let e = &mut store.entities_mut()[0];
            e.pos = Vec2::new(100.0, BOUNDS.height - FADE_MARGIN + 1.0);
            e.vel = Vec2::new(0.0, 0.0);
            e.gravity = 0.0;
        }
        let input = TickInput::default();
        let mut last = store.get(0).unwrap().opacity;
        loop {
            tick(&mut store, &input, BOUNDS);
            if store.recycled_total() > 0 {
                break;
            }
            let now = store.get(0).unwrap().opacity;
            assert!(now <= last);
            last = now;
        }
        assert_eq!(store.get(0).unwrap().opacity, 1.0);
    }
}
