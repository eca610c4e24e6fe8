//! Sparkfield - decorative particle effects for canvas surfaces
//!
//! Core modules:
//! - `sim`: Entity store, physics, pointer force, proximity links
//! - `renderer`: Raster surface abstraction and the stateless frame painter
//! - `lifecycle`: Frame clock, field scheduler, celebration overlay
//! - `platform`: Browser wiring and one-time initialization
//! - `settings`: Per-instance configuration

pub mod error;
pub mod lifecycle;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, SurfaceError};
pub use lifecycle::{CelebrationOverlay, FieldAnimator, FrameClock, ManualClock, OverlayStatus};
pub use platform::ensure_initialized;
pub use settings::{Color, FieldConfig, OverlayConfig};
pub use sim::Variant;

use glam::Vec2;

/// Engine tuning constants
pub mod consts {
    /// Pointer repulsion radius (surface units)
    pub const POINTER_RADIUS: f32 = 100.0;
    /// Pointer repulsion strength at distance zero
    pub const POINTER_STRENGTH: f32 = 0.5;

    /// Link threshold for the particle network
    pub const LINK_THRESHOLD: f32 = 100.0;
    /// Link alpha at distance zero
    pub const LINK_BASE_ALPHA: f32 = 0.3;
    /// Link stroke width (logical pixels)
    pub const LINK_WIDTH: f32 = 0.5;

    /// Per-tick velocity damping for the pointer-reactive network
    pub const NETWORK_DAMPING: f32 = 0.99;

    /// Confetti gravity (added to vy every tick)
    pub const CONFETTI_GRAVITY: f32 = 0.15;
    /// Confetti wind jitter amplitude on vx
    pub const CONFETTI_JITTER: f32 = 0.1;
    /// Distance above the bottom edge where confetti starts fading
    pub const FADE_MARGIN: f32 = 100.0;
    /// Opacity lost per tick while fading
    pub const FADE_RATE: f32 = 0.02;
    /// Distance below the bottom edge where confetti is recycled
    pub const OVERSHOOT_MARGIN: f32 = 50.0;

    /// Overlay auto-stop delay (ms)
    pub const OVERLAY_DURATION_MS: f64 = 5000.0;
    /// Overlay fade-in on play (ms)
    pub const OVERLAY_FADE_IN_MS: f64 = 300.0;
    /// Overlay fade-out on stop (ms)
    pub const OVERLAY_FADE_OUT_MS: f64 = 500.0;

    /// Floating stars behind the confetti, per play
    pub const STAR_BURST_COUNT: usize = 20;

    /// Populations above this make the O(n²) link scan noticeable
    pub const RECOMMENDED_MAX_POPULATION: usize = 50;

    /// Default populations per variant
    pub const AMBIENT_POPULATION: usize = 15;
    pub const NETWORK_POPULATION: usize = 30;
    pub const CONFETTI_POPULATION: usize = 150;
}

/// Axis-aligned surface bounds in logical (CSS pixel) units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center of the surface
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a point lies within the closed rectangle [0, w] x [0, h]
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}
