//! Particle simulation module
//!
//! Pure data and per-tick math. No rendering or platform dependencies:
//! - Seeded RNG only
//! - Slots addressed by stable index, recycled in place

pub mod physics;
pub mod pointer;
pub mod proximity;
pub mod state;
pub mod tick;

pub use physics::{BoundaryOutcome, BoundaryPolicy, PhysicsParams, apply_boundary, integrate};
pub use pointer::PointerForce;
pub use proximity::{Link, ProximityAnalyzer};
pub use state::{Entity, EntityStore, ShapeKind, Variant};
pub use tick::{TickInput, TickReport, tick};
