//! Pairwise proximity links for the particle network
//!
//! Brute-force O(n²) over active entities. Fine for the 15-50 entity
//! populations this is tuned for; larger populations would want grid
//! bucketing.

use super::state::Entity;
use crate::consts::{LINK_BASE_ALPHA, LINK_THRESHOLD};

/// A connective line between two entity slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub alpha: f32,
}

/// Derives the link set for a frame; the buffer is reused across ticks
#[derive(Debug, Clone)]
pub struct ProximityAnalyzer {
    pub threshold: f32,
    pub base_alpha: f32,
    links: Vec<Link>,
}

impl Default for ProximityAnalyzer {
    fn default() -> Self {
        Self::new(LINK_THRESHOLD, LINK_BASE_ALPHA)
    }
}

impl ProximityAnalyzer {
    pub fn new(threshold: f32, base_alpha: f32) -> Self {
        Self {
            threshold,
            base_alpha,
            links: Vec::new(),
        }
    }

    /// Recompute links for every unordered pair closer than the threshold
    pub fn analyze(&mut self, entities: &[Entity]) -> &[Link] {
        self.links.clear();
        let threshold_sq = self.threshold * self.threshold;

        for (i, a) in entities.iter().enumerate() {
            if !a.is_active() {
                continue;
            }
            for (offset, b) in entities[i + 1..].iter().enumerate() {
                if !b.is_active() {
                    continue;
                }
                let dist_sq = a.pos.distance_squared(b.pos);
                if dist_sq >= threshold_sq {
                    continue;
                }
                let distance = dist_sq.sqrt();
                self.links.push(Link {
                    a: i,
                    b: i + 1 + offset,
                    alpha: (1.0 - distance / self.threshold) * self.base_alpha,
                });
            }
        }

        &self.links
    }

    /// Links from the most recent `analyze`
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Drop links (variants without a network)
    pub fn clear(&mut self) {
        self.links.clear();
    }
}
