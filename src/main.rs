//! Sparkfield entry point
//!
//! On the web, mounts onto `<canvas id="sparkfield">` using its
//! `data-variant` and `data-config` attributes. Natively, runs a headless
//! demo against the mesh backend and logs what it drew.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_page {
    use std::cell::RefCell;

    use sparkfield::platform::web::{FieldHandle, OverlayHandle, mount_field_js, mount_overlay_js};

    const CANVAS_ID: &str = "sparkfield";

    // Held only so the handle's listeners stay registered
    #[allow(dead_code)]
    enum Mounted {
        Field(FieldHandle),
        Overlay(OverlayHandle),
    }

    thread_local! {
        // Lives for the page; nothing unmounts the auto-mounted canvas
        static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
    }

    pub fn run() {
        sparkfield::ensure_initialized();

        let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CANVAS_ID))
        else {
            log::info!("no #{} canvas on this page; waiting for mountField/mountOverlay", CANVAS_ID);
            return;
        };

        let variant = canvas
            .get_attribute("data-variant")
            .unwrap_or_else(|| "network".to_string());
        let config = canvas.get_attribute("data-config");

        let mounted = if variant.eq_ignore_ascii_case("celebration") {
            mount_overlay_js(CANVAS_ID, config).map(Mounted::Overlay)
        } else {
            mount_field_js(CANVAS_ID, &variant, config).map(Mounted::Field)
        };

        match mounted {
            Ok(m) => {
                log::info!("mounted {} on #{}", variant, CANVAS_ID);
                MOUNTED.with(|slot| *slot.borrow_mut() = Some(m));
            }
            Err(e) => log::warn!("could not mount #{}: {:?}", CANVAS_ID, e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_page::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use sparkfield::Variant;

    sparkfield::ensure_initialized();
    log::info!("Sparkfield (native) starting...");
    log::info!("Native mode renders headless - build for wasm32 to see it in a browser");

    let variant = std::env::args()
        .nth(1)
        .and_then(|arg| Variant::parse(&arg))
        .unwrap_or_default();

    let result = match variant {
        Variant::Celebration => demo::celebration(),
        other => demo::field(other),
    };
    if let Err(e) = result {
        log::error!("demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use sparkfield::renderer::MeshSurface;
    use sparkfield::{
        Bounds, CelebrationOverlay, FieldAnimator, FieldConfig, ManualClock, OverlayConfig, SurfaceError,
        Variant,
    };

    const BOUNDS: Bounds = Bounds::new(800.0, 600.0);
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const FRAMES: u32 = 600;

    pub fn field(variant: Variant) -> Result<(), SurfaceError> {
        let config = match variant {
            Variant::Ambient => FieldConfig::ambient(),
            _ => FieldConfig::default(),
        };
        let mut field = FieldAnimator::new(config, variant, ManualClock::new(), 42);
        field.mount(MeshSurface::new(), BOUNDS, 2.0)?;

        let mut peak_links = 0;
        for frame in 0..FRAMES {
            // Sweep the pointer across the middle of the surface
            let x = BOUNDS.width * frame as f32 / FRAMES as f32;
            field.pointer_moved(Vec2::new(x, BOUNDS.height / 2.0));
            if field.clock_mut().fire() {
                field.on_frame(frame as f64 * FRAME_MS);
            }
            peak_links = peak_links.max(field.links().len());
        }
        field.pointer_left();

        if let Some(surface) = field.surface() {
            let stats = surface.stats();
            log::info!(
                "{}: {} ticks, last frame {} vertices ({} bytes), peak {} links",
                variant.as_str(),
                field.ticks(),
                surface.vertices().len(),
                surface.vertex_bytes().len(),
                peak_links
            );
            log::info!(
                "draw calls: {} circles, {} polygons, {} lines",
                stats.circles,
                stats.polygons,
                stats.lines
            );
        }
        field.unmount();
        Ok(())
    }

    pub fn celebration() -> Result<(), SurfaceError> {
        let mut overlay = CelebrationOverlay::new(OverlayConfig::default(), ManualClock::new(), 42);
        overlay.set_on_complete(|| log::info!("onComplete fired"));
        overlay.mount(MeshSurface::new(), BOUNDS, 1.0)?;

        let mut now = 0.0;
        overlay.play(now);
        while overlay.clock_mut().fire() {
            now += FRAME_MS;
            overlay.on_frame(now);
            if let Some(reveal) = overlay.reveal() {
                log::debug!("{:.0} ms: {}", now, reveal.headline());
            }
        }

        let stats = overlay.stats();
        log::info!(
            "celebration: {} ticks over {:.0} ms, status {}",
            stats.ticks,
            now,
            overlay.status().as_str()
        );
        overlay.unmount();
        Ok(())
    }
}
