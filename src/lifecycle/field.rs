//! Scheduler for the ambient field and the pointer-reactive network
//!
//! Owns the surface, the entity store and the frame subscription for the
//! mounted lifetime of one canvas. Each frame runs
//! physics → proximity → paint, in that order.

use glam::Vec2;

use super::clock::{FrameClock, FrameRequest};
use crate::Bounds;
use crate::error::SurfaceError;
use crate::renderer::{FrameStyle, Surface, SurfaceContext, draw_frame};
use crate::settings::{Color, FieldConfig};
use crate::sim::{EntityStore, Link, PointerForce, ProximityAnalyzer, TickInput, Variant, tick};

/// Continuous animation over one mounted surface
pub struct FieldAnimator<S: Surface, C: FrameClock> {
    config: FieldConfig,
    variant: Variant,
    seed: u64,
    clock: C,
    surface: Option<S>,
    context: Option<SurfaceContext>,
    store: Option<EntityStore>,
    pointer: PointerForce,
    proximity: ProximityAnalyzer,
    pending: Option<FrameRequest>,
    alive: bool,
    ticks: u64,
    generation: u64,
}

impl<S: Surface, C: FrameClock> FieldAnimator<S, C> {
    pub fn new(config: FieldConfig, variant: Variant, clock: C, seed: u64) -> Self {
        Self {
            config,
            variant,
            seed,
            clock,
            surface: None,
            context: None,
            store: None,
            pointer: PointerForce::default(),
            proximity: ProximityAnalyzer::default(),
            pending: None,
            alive: false,
            ticks: 0,
            generation: 0,
        }
    }

    /// Take ownership of a surface, populate the store and start ticking.
    ///
    /// On failure nothing is started and the surface is dropped.
    pub fn mount(&mut self, mut surface: S, logical: Bounds, pixel_ratio: f32) -> Result<(), SurfaceError> {
        if self.alive {
            self.unmount();
        }

        let context = SurfaceContext::new(logical, pixel_ratio);
        if let Err(e) = surface.configure(context) {
            log::warn!("{} field not started: {}", self.variant.as_str(), e);
            return Err(e);
        }

        self.surface = Some(surface);
        self.context = Some(context);
        self.rebuild_store(logical);
        self.alive = true;
        self.subscribe();

        log::info!(
            "{} field mounted: {} entities, {}x{} @{}x",
            self.variant.as_str(),
            self.config.effective_population(),
            logical.width,
            logical.height,
            context.pixel_ratio
        );
        Ok(())
    }

    /// Frame callback. A no-op once teardown has begun.
    pub fn on_frame(&mut self, _timestamp: f64) {
        self.pending = None;
        if !self.alive {
            return;
        }
        self.step();
        self.subscribe();
    }

    /// Pointer position in surface-local coordinates
    pub fn pointer_moved(&mut self, pos: Vec2) {
        if self.alive && self.pointer_enabled() {
            self.pointer.set_position(pos);
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer.clear();
    }

    /// Resize the pixel buffer; entity positions are left untouched
    pub fn resize(&mut self, logical: Bounds, pixel_ratio: f32) {
        if !self.alive {
            return;
        }
        let context = SurfaceContext::new(logical, pixel_ratio);
        let result = match self.surface.as_mut() {
            Some(surface) => surface.configure(context),
            None => Err(SurfaceError::Detached),
        };
        match result {
            Ok(()) => {
                log::debug!(
                    "field resized to {}x{} @{}x",
                    logical.width,
                    logical.height,
                    context.pixel_ratio
                );
                self.context = Some(context);
            }
            Err(e) => {
                log::warn!("surface lost on resize: {}", e);
                self.unmount();
            }
        }
    }

    /// Apply a new configuration.
    ///
    /// Population or palette changes cancel the subscription, rebuild the
    /// store and resubscribe. Other changes apply in place.
    pub fn reconfigure(&mut self, config: FieldConfig) {
        if let Err(e) = config.validate() {
            log::warn!("ignoring invalid field config: {}", e);
            return;
        }
        let rebuild = self.config.requires_reinit(&config);
        self.config = config;
        if !self.pointer_enabled() {
            self.pointer.clear();
        }

        if !(rebuild && self.alive) {
            return;
        }
        self.cancel_subscription();
        if let Some(context) = self.context {
            self.rebuild_store(context.logical);
        }
        self.subscribe();
        log::debug!(
            "field reconfigured: {} entities",
            self.config.effective_population()
        );
    }

    /// Stop everything synchronously and hand the surface back
    pub fn unmount(&mut self) -> Option<S> {
        self.alive = false;
        self.cancel_subscription();
        self.pointer.clear();
        self.proximity.clear();
        self.store = None;
        self.context = None;
        if self.surface.is_some() {
            log::info!("{} field unmounted after {} ticks", self.variant.as_str(), self.ticks);
        }
        self.surface.take()
    }

    pub fn is_mounted(&self) -> bool {
        self.alive
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&EntityStore> {
        self.store.as_ref()
    }

    /// Mutable store access for scripted scenes
    pub fn store_mut(&mut self) -> Option<&mut EntityStore> {
        self.store.as_mut()
    }

    pub fn links(&self) -> &[Link] {
        self.proximity.links()
    }

    pub fn pointer(&self) -> &PointerForce {
        &self.pointer
    }

    pub fn context(&self) -> Option<SurfaceContext> {
        self.context
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn pointer_enabled(&self) -> bool {
        self.config.pointer_interaction_enabled && self.variant.accepts_pointer()
    }

    fn link_color(&self) -> Color {
        self.config
            .palette
            .first()
            .copied()
            .unwrap_or(Color::rgb(255, 255, 255))
    }

    fn rebuild_store(&mut self, bounds: Bounds) {
        self.generation += 1;
        self.proximity.clear();
        self.store = Some(EntityStore::initialize(
            self.variant,
            self.config.effective_population(),
            &self.config.palette,
            bounds,
            self.seed.wrapping_add(self.generation),
        ));
    }

    fn subscribe(&mut self) {
        if self.pending.is_none() {
            self.pending = self.clock.request_frame();
        }
    }

    fn cancel_subscription(&mut self) {
        if let Some(request) = self.pending.take() {
            self.clock.cancel_frame(request);
        }
    }

    fn step(&mut self) {
        let style = FrameStyle::new(self.link_color());
        let input = TickInput {
            pointer: self.pointer_enabled().then_some(self.pointer),
        };
        let (Some(store), Some(context)) = (self.store.as_mut(), self.context) else {
            return;
        };
        tick(store, &input, context.logical);

        if self.variant.draws_links() && self.config.quality.links_enabled() {
            self.proximity.analyze(store.entities());
        } else {
            self.proximity.clear();
        }

        if let Some(surface) = self.surface.as_mut() {
            draw_frame(surface, store.entities(), self.proximity.links(), &style);
        }
        self.ticks += 1;
    }
}

impl<S: Surface, C: FrameClock> Drop for FieldAnimator<S, C> {
    fn drop(&mut self) {
        self.alive = false;
        self.cancel_subscription();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::clock::{ManualClock, SharedClock};
    use crate::renderer::MeshSurface;

    const BOUNDS: Bounds = Bounds::new(320.0, 240.0);

    fn animator(variant: Variant) -> FieldAnimator<MeshSurface, ManualClock> {
        let config = match variant {
            Variant::Ambient => FieldConfig::ambient(),
            _ => FieldConfig::default(),
        };
        FieldAnimator::new(config, variant, ManualClock::new(), 77)
    }

    /// Deliver the pending frame, if any
    fn pump(anim: &mut FieldAnimator<MeshSurface, ManualClock>, t: f64) -> bool {
        if anim.clock_mut().fire() {
            anim.on_frame(t);
            true
        } else {
            false
        }
    }

    #[test]
    fn test_mount_subscribes_and_ticks() {
        let mut anim = animator(Variant::Network);
        anim.mount(MeshSurface::new(), BOUNDS, 1.0).unwrap();
        assert!(anim.is_mounted());
        assert_eq!(anim.store().unwrap().len(), 30);

        for i in 0..10 {
            assert!(pump(&mut anim, i as f64 * 16.0));
        }
        assert_eq!(anim.ticks(), 10);
        assert!(anim.clock().pending().is_some());
        assert!(anim.surface().unwrap().stats().clears >= 10);
    }

    #[test]
    fn test_unavailable_surface_does_not_start() {
        let mut anim = animator(Variant::Network);
        let result = anim.mount(MeshSurface::detached(), BOUNDS, 1.0);
        assert_eq!(result, Err(SurfaceError::Detached));
        assert!(!anim.is_mounted());
        assert_eq!(anim.clock().requests(), 0);
        assert!(anim.store().is_none());
    }

    #[test]
    fn test_unmount_cancels_and_ignores_stale_frames() {
        let mut anim = animator(Variant::Network);
        anim.mount(MeshSurface::new(), BOUNDS, 1.0).unwrap();
        pump(&mut anim, 0.0);

        let surface = anim.unmount();
        assert!(surface.is_some());
        assert_eq!(anim.clock().pending(), None);
        assert_eq!(anim.clock().cancels(), 1);

        // A callback that slipped through after teardown
        anim.on_frame(32.0);
        assert_eq!(anim.ticks(), 1);
        assert_eq!(anim.clock().pending(), None);
    }

    #[test]
    fn test_pointer_ignored_when_disabled_or_unmounted() {
        let mut anim = animator(Variant::Network);
        anim.pointer_moved(Vec2::new(5.0, 5.0));
        assert_eq!(anim.pointer().position(), None);

        anim.mount(MeshSurface::new(), BOUNDS, 1.0).unwrap();
        anim.pointer_moved(Vec2::new(5.0, 5.0));
        assert_eq!(anim.pointer().position(), Some(Vec2::new(5.0, 5.0)));

        let mut config = anim.config().clone();
        config.pointer_interaction_enabled = false;
        anim.reconfigure(config);
        assert_eq!(anim.pointer().position(), None);
        anim.pointer_moved(Vec2::new(9.0, 9.0));
        assert_eq!(anim.pointer().position(), None);
    }

    #[test]
    fn test_ambient_never_links() {
        let mut anim = animator(Variant::Ambient);
        anim.mount(MeshSurface::new(), BOUNDS, 1.0).unwrap();
        for i in 0..20 {
            pump(&mut anim, i as f64);
        }
        assert!(anim.links().is_empty());
        assert_eq!(anim.surface().unwrap().stats().lines, 0);
    }

    #[test]
    fn test_reconfigure_population_rebuilds() {
        let mut anim = animator(Variant::Network);
        anim.mount(MeshSurface::new(), BOUNDS, 1.0).unwrap();
        pump(&mut anim, 0.0);

        let mut config = anim.config().clone();
        config.population = 12;
        anim.reconfigure(config);
        assert_eq!(anim.store().unwrap().len(), 12);
        // Old request cancelled, a new one armed
        assert_eq!(anim.clock().cancels(), 1);
        assert!(anim.clock().pending().is_some());

        let mut bad = anim.config().clone();
        bad.palette.clear();
        anim.reconfigure(bad);
        assert_eq!(anim.store().unwrap().len(), 12);
        assert!(!anim.config().palette.is_empty());
    }

    #[test]
    fn test_resize_keeps_entities() {
        let mut anim = animator(Variant::Network);
        anim.mount(MeshSurface::new(), BOUNDS, 2.0).unwrap();
        let before = anim.store().unwrap().entities().to_vec();

        anim.resize(Bounds::new(100.0, 100.0), 1.0);
        assert_eq!(anim.context().unwrap().logical, Bounds::new(100.0, 100.0));
        assert_eq!(anim.surface().unwrap().stats().configures, 2);
        assert_eq!(anim.store().unwrap().entities(), &before[..]);
    }

    #[test]
    fn test_drop_cancels_pending_frame() {
        let clock = SharedClock::default();
        let mut anim = FieldAnimator::new(FieldConfig::default(), Variant::Network, clock.clone(), 5);
        anim.mount(MeshSurface::new(), BOUNDS, 1.0).unwrap();
        assert!(anim.clock_mut().0.borrow_mut().fire());
        anim.on_frame(0.0);
        assert!(clock.0.borrow().pending().is_some());

        drop(anim);
        assert_eq!(clock.0.borrow().pending(), None);
        assert_eq!(clock.0.borrow().cancels(), 1);
    }
}
