//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger and panic hook installation
//! - Frame scheduling (requestAnimationFrame on web)
//! - DOM listeners and the JS-facing handles

use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_arch = "wasm32")]
pub mod web;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// One-time process setup. Returns true only for the call that did the work.
pub fn ensure_initialized() -> bool {
    if INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return false;
    }
    install_logging();
    true
}

#[cfg(target_arch = "wasm32")]
fn install_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Another logger was installed by the host page
        return;
    }
    log::info!("sparkfield {} ready", env!("CARGO_PKG_VERSION"));
}

#[cfg(not(target_arch = "wasm32"))]
fn install_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
