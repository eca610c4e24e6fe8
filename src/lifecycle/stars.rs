//! Floating star burst behind the confetti
//!
//! A fixed set of stars spawned once per play. Each pops in, then drifts
//! upward while spinning and fading out. Stars are never recycled, so a
//! burst is spent once its slowest star has faded.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::easing::power_out;
use crate::Bounds;
use crate::settings::Color;
use crate::sim::{Entity, ShapeKind};

const POP_MS: f64 = 500.0;
const POP_DELAY_MAX_MS: f64 = 500.0;
const POP_SCALE: f32 = 1.5;
const DRIFT_DELAY_MS: f64 = 500.0;
const DRIFT_DELAY_SPREAD_MS: f64 = 500.0;
const DRIFT_MS: f64 = 2000.0;
const DRIFT_SPREAD_MS: f64 = 2000.0;

/// Latest moment, relative to the burst start, at which any star is visible
pub const BURST_SPAN_MS: f64 = DRIFT_DELAY_MS + DRIFT_DELAY_SPREAD_MS + DRIFT_MS + DRIFT_SPREAD_MS;

/// Per-star timing and motion, sampled once at spawn
#[derive(Debug, Clone, Copy, PartialEq)]
struct Track {
    origin: Vec2,
    size: f32,
    pop_delay: f64,
    drift_delay: f64,
    drift_ms: f64,
    drift: Vec2,
    spin: f32,
}

impl Track {
    fn sample(rng: &mut Pcg32, bounds: Bounds) -> Self {
        Self {
            origin: Vec2::new(
                rng.random::<f32>() * bounds.width,
                rng.random::<f32>() * bounds.height,
            ),
            size: 24.0 + rng.random::<f32>() * 12.0,
            pop_delay: rng.random::<f64>() * POP_DELAY_MAX_MS,
            drift_delay: DRIFT_DELAY_MS + rng.random::<f64>() * DRIFT_DELAY_SPREAD_MS,
            drift_ms: DRIFT_MS + rng.random::<f64>() * DRIFT_SPREAD_MS,
            drift: Vec2::new(
                (rng.random::<f32>() - 0.5) * 200.0,
                -100.0 - rng.random::<f32>() * 200.0,
            ),
            spin: rng.random::<f32>() * TAU,
        }
    }

    fn pop(&self, elapsed: f64) -> f32 {
        let t = ((elapsed - self.pop_delay) / POP_MS).clamp(0.0, 1.0);
        power_out(2, t as f32)
    }

    /// Write this star's state at `elapsed` ms into `star`
    fn apply(&self, elapsed: f64, star: &mut Entity) {
        let pop = self.pop(elapsed);
        star.size = self.size * (1.0 + (POP_SCALE - 1.0) * pop);

        if elapsed < self.drift_delay {
            star.pos = self.origin;
            star.rotation = 0.0;
            star.opacity = pop;
            return;
        }
        // The fade starts from whatever the pop had reached
        let t = ((elapsed - self.drift_delay) / self.drift_ms).clamp(0.0, 1.0);
        let k = power_out(1, t as f32);
        star.pos = self.origin + self.drift * k;
        star.rotation = self.spin * k;
        star.opacity = (self.pop(self.drift_delay) * (1.0 - k)).clamp(0.0, 1.0);
    }

    fn ends_at(&self) -> f64 {
        self.drift_delay + self.drift_ms
    }
}

/// One play's worth of floating stars
#[derive(Debug, Clone)]
pub struct StarBurst {
    started_at: f64,
    tracks: Vec<Track>,
    stars: Vec<Entity>,
}

impl StarBurst {
    pub fn new(count: usize, palette: &[Color], bounds: Bounds, started_at: f64, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut tracks = Vec::with_capacity(count);
        let mut stars = Vec::with_capacity(count);
        for _ in 0..count {
            let track = Track::sample(&mut rng, bounds);
            let color = match palette.len() {
                0 => Color::rgb(255, 215, 0),
                n => palette[rng.random_range(0..n)],
            };
            stars.push(Entity {
                pos: track.origin,
                vel: Vec2::ZERO,
                size: track.size,
                color,
                rotation: 0.0,
                angular_vel: 0.0,
                opacity: 0.0,
                gravity: 0.0,
                shape: ShapeKind::Star,
            });
            tracks.push(track);
        }
        Self {
            started_at,
            tracks,
            stars,
        }
    }

    /// Move every star to its state at `now`
    pub fn advance(&mut self, now: f64) {
        let elapsed = (now - self.started_at).max(0.0);
        for (track, star) in self.tracks.iter().zip(self.stars.iter_mut()) {
            track.apply(elapsed, star);
        }
    }

    pub fn stars(&self) -> &[Entity] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Timestamp after which every star has faded out
    pub fn ends_at(&self) -> f64 {
        self.started_at + self.tracks.iter().map(Track::ends_at).fold(0.0, f64::max)
    }

    pub fn is_spent(&self, now: f64) -> bool {
        now >= self.ends_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::palettes;

    const BOUNDS: Bounds = Bounds::new(800.0, 600.0);

    fn burst(seed: u64) -> StarBurst {
        StarBurst::new(20, &palettes::CELEBRATION, BOUNDS, 1000.0, seed)
    }

    #[test]
    fn test_spawns_hidden_stars() {
        let b = burst(1);
        assert_eq!(b.len(), 20);
        for s in b.stars() {
            assert_eq!(s.shape, ShapeKind::Star);
            assert_eq!(s.opacity, 0.0);
            assert!(BOUNDS.contains(s.pos));
            assert!(palettes::CELEBRATION.contains(&s.color));
        }
    }

    #[test]
    fn test_every_star_fades_out_within_span() {
        for seed in 0..20 {
            let mut b = burst(seed);
            assert!(b.ends_at() <= 1000.0 + BURST_SPAN_MS);

            b.advance(1000.0 + 900.0);
            assert!(b.stars().iter().any(|s| s.opacity > 0.0));

            b.advance(1000.0 + BURST_SPAN_MS);
            assert!(b.is_spent(1000.0 + BURST_SPAN_MS));
            assert!(b.stars().iter().all(|s| s.opacity == 0.0));
        }
    }

    #[test]
    fn test_stars_pop_then_rise() {
        let mut b = burst(7);
        let origins: Vec<Vec2> = b.stars().iter().map(|s| s.pos).collect();
        let mut last = vec![f32::MAX; b.len()];
        let mut now = 1000.0 + 1000.0;
        while now <= b.ends_at() {
            b.advance(now);
            for (i, s) in b.stars().iter().enumerate() {
                assert!(s.pos.y <= origins[i].y + 1e-3);
                assert!(s.opacity <= last[i] + 1e-6, "star {} brightened while fading", i);
                assert!(s.size >= 24.0 && s.size <= 36.0 * POP_SCALE + 1e-3);
                last[i] = s.opacity;
            }
            now += 16.0;
        }
    }

    #[test]
    fn test_before_start_stays_hidden() {
        let mut b = burst(3);
        b.advance(0.0);
        assert!(b.stars().iter().all(|s| s.opacity == 0.0));
    }
}
