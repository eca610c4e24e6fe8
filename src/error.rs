//! Error types
//!
//! Nothing here is fatal: callers log these and fall back to drawing nothing.

use thiserror::Error;

/// The rendering surface or its drawing context could not be acquired
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// No element with the requested id, or it is not a canvas
    #[error("surface `{0}` not found")]
    Unavailable(String),
    /// The canvas exists but refused a 2D context
    #[error("2d context unavailable")]
    ContextUnavailable,
    /// The surface was detached (unmounted or never attached)
    #[error("surface detached")]
    Detached,
}

/// Invalid instance configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("palette must contain at least one color")]
    EmptyPalette,
    #[error("population must be at least 1")]
    ZeroPopulation,
    #[error("invalid color `{0}` (expected #RRGGBB or #RRGGBBAA)")]
    InvalidColor(String),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
