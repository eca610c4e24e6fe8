//! Entity types and the fixed-capacity entity store
//!
//! The store is an arena addressed by slot index. Slots are respawned in
//! place; the vector never grows or shrinks between reconfigurations.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::Bounds;
use crate::consts::*;
use crate::settings::Color;

/// Which effect an engine instance drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Slow floating dots and tiles that wrap around the edges
    Ambient,
    /// Pointer-reactive dots joined by proximity links
    #[default]
    Network,
    /// Falling confetti, sparkles and stars for the overlay
    Celebration,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Ambient => "ambient",
            Variant::Network => "network",
            Variant::Celebration => "celebration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ambient" | "floating" => Some(Variant::Ambient),
            "network" | "field" => Some(Variant::Network),
            "celebration" | "confetti" => Some(Variant::Celebration),
            _ => None,
        }
    }

    /// Whether the proximity analyzer runs for this variant
    pub fn draws_links(&self) -> bool {
        matches!(self, Variant::Network)
    }

    /// Whether pointer repulsion can apply
    pub fn accepts_pointer(&self) -> bool {
        matches!(self, Variant::Network)
    }
}

/// Drawing routine, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Filled circle, `size` is the radius
    Dot,
    /// Rectangle `size` wide, `size / 2` tall
    Fleck,
    /// Rhombus `size` tall, `size / 2` wide
    Diamond,
    /// Five-point star, outer radius `size / 2`
    Star,
    /// Square `size` on a side
    Tile,
}

/// One simulated visual element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Color,
    /// Radians
    pub rotation: f32,
    /// Radians per tick
    pub angular_vel: f32,
    /// 0 = inactive
    pub opacity: f32,
    /// Added to vel.y every tick
    pub gravity: f32,
    pub shape: ShapeKind,
}

impl Entity {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Uniform sample in [lo, hi); tolerates an empty range (returns lo)
#[inline]
pub(crate) fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

/// Whether a spawn fills the store or replaces an expired slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpawnPhase {
    Initial,
    Respawn,
}

fn pick_color(palette: &[Color], rng: &mut impl Rng) -> Color {
    if palette.is_empty() {
        return Color::rgb(255, 255, 255);
    }
    palette[rng.random_range(0..palette.len())]
}

fn spawn(
    variant: Variant,
    palette: &[Color],
    bounds: Bounds,
    rng: &mut impl Rng,
    phase: SpawnPhase,
) -> Entity {
    let color = pick_color(palette, rng);
    match variant {
        Variant::Ambient => {
            // Outer extent in surface units: dot diameter or tile side
            let extent = uniform(rng, 2.0, 8.0);
            let (shape, size) = if rng.random_bool(0.5) {
                (ShapeKind::Dot, extent / 2.0)
            } else {
                (ShapeKind::Tile, extent)
            };
            Entity {
                pos: Vec2::new(uniform(rng, 0.0, bounds.width), uniform(rng, 0.0, bounds.height)),
                vel: Vec2::new(uniform(rng, -0.3, 0.3), uniform(rng, -0.3, 0.3)),
                size,
                color,
                rotation: uniform(rng, 0.0, TAU),
                angular_vel: uniform(rng, -0.5, 0.5).to_radians(),
                opacity: uniform(rng, 0.1, 0.5),
                gravity: 0.0,
                shape,
            }
        }
        Variant::Network => Entity {
            pos: Vec2::new(uniform(rng, 0.0, bounds.width), uniform(rng, 0.0, bounds.height)),
            vel: Vec2::new(uniform(rng, -0.25, 0.25), uniform(rng, -0.25, 0.25)),
            size: uniform(rng, 1.0, 4.0),
            color,
            rotation: 0.0,
            angular_vel: 0.0,
            opacity: uniform(rng, 0.2, 0.7),
            gravity: 0.0,
            shape: ShapeKind::Dot,
        },
        Variant::Celebration => {
            let shape = match rng.random_range(0..3) {
                0 => ShapeKind::Fleck,
                1 => ShapeKind::Diamond,
                _ => ShapeKind::Star,
            };
            let size = if shape == ShapeKind::Star {
                uniform(rng, 10.0, 25.0)
            } else {
                uniform(rng, 4.0, 16.0)
            };
            // Initial fill staggers entries over one surface height for a cascade
            let y = match phase {
                SpawnPhase::Initial => -uniform(rng, 0.0, bounds.height),
                SpawnPhase::Respawn => -20.0 - uniform(rng, 0.0, 100.0),
            };
            Entity {
                pos: Vec2::new(uniform(rng, 0.0, bounds.width), y),
                vel: Vec2::new(uniform(rng, -4.0, 4.0), uniform(rng, 2.0, 6.0)),
                size,
                color,
                rotation: uniform(rng, 0.0, TAU),
                angular_vel: uniform(rng, -5.0, 5.0).to_radians(),
                opacity: 1.0,
                gravity: CONFETTI_GRAVITY,
                shape,
            }
        }
    }
}

/// Fixed-capacity arena of entities plus the RNG that feeds them
#[derive(Debug, Clone)]
pub struct EntityStore {
    variant: Variant,
    palette: Vec<Color>,
    entities: Vec<Entity>,
    rng: Pcg32,
    recycled: u64,
}

impl EntityStore {
    /// Populate `capacity` slots with freshly spawned entities
    pub fn initialize(
        variant: Variant,
        capacity: usize,
        palette: &[Color],
        bounds: Bounds,
        seed: u64,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let entities = (0..capacity)
            .map(|_| spawn(variant, palette, bounds, &mut rng, SpawnPhase::Initial))
            .collect();
        Self {
            variant,
            palette: palette.to_vec(),
            entities,
            rng,
            recycled: 0,
        }
    }

    /// Respawn one slot in place
    pub fn recycle(&mut self, index: usize, bounds: Bounds) {
        if index >= self.entities.len() {
            return;
        }
        self.entities[index] = spawn(
            self.variant,
            &self.palette,
            bounds,
            &mut self.rng,
            SpawnPhase::Respawn,
        );
        self.recycled += 1;
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Slot access for scripted setups; the slice length cannot change
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    /// Total respawns since initialization
    pub fn recycled_total(&self) -> u64 {
        self.recycled
    }

    /// Borrow one slot together with the RNG
    pub(crate) fn slot_and_rng(&mut self, index: usize) -> (&mut Entity, &mut Pcg32) {
        (&mut self.entities[index], &mut self.rng)
    }
}
