//! Lifecycle module
//!
//! Schedulers that own a surface, a store and a frame subscription:
//! - `FieldAnimator` runs until unmounted
//! - `CelebrationOverlay` runs one bounded burst per `play`

pub mod clock;
pub mod easing;
pub mod field;
pub mod overlay;
pub mod reveal;
pub mod stars;

pub use clock::{FrameClock, FrameRequest, ManualClock};
pub use field::FieldAnimator;
pub use overlay::{CelebrationOverlay, OverlaySession, OverlayStats, OverlayStatus};
pub use reveal::{CountUp, Reveal, RevealFrame, RevealTimeline, ScrambleText};
pub use stars::StarBurst;
