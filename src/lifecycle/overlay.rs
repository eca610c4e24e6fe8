//! Celebration overlay: a one-shot confetti burst over floating stars, with a bounded lifetime
//!
//! `Idle → Playing → Stopping → Idle`. The auto-stop timer is a deadline
//! checked at the top of each frame, so it is cancelled together with the
//! frame subscription.

use super::clock::{FrameClock, FrameRequest};
use super::reveal::Reveal;
use super::stars::StarBurst;
use crate::Bounds;
use crate::consts::{OVERLAY_FADE_IN_MS, OVERLAY_FADE_OUT_MS, STAR_BURST_COUNT};
use crate::error::SurfaceError;
use crate::renderer::{FrameStyle, Surface, SurfaceContext, draw_layered_frame};
use crate::settings::{Color, OverlayConfig};
use crate::sim::{EntityStore, TickInput, Variant, tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayStatus {
    #[default]
    Idle,
    Playing,
    Stopping,
}

impl OverlayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayStatus::Idle => "idle",
            OverlayStatus::Playing => "playing",
            OverlayStatus::Stopping => "stopping",
        }
    }
}

/// Timing of the current play-through
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlaySession {
    pub status: OverlayStatus,
    pub started_at: f64,
    pub auto_stop_at: Option<f64>,
    pub fade_started_at: f64,
    /// Overlay opacity when the fade-out began
    pub fade_from: f32,
}

/// Counters for tests and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub initializations: u32,
    pub timers_armed: u32,
    pub ticks: u64,
    pub completions: u32,
}

type CompleteCallback = Box<dyn FnMut()>;

pub struct CelebrationOverlay<S: Surface, C: FrameClock> {
    config: OverlayConfig,
    seed: u64,
    clock: C,
    surface: Option<S>,
    context: Option<SurfaceContext>,
    store: Option<EntityStore>,
    reveal: Option<Reveal>,
    stars: Option<StarBurst>,
    session: OverlaySession,
    pending: Option<FrameRequest>,
    alive: bool,
    stats: OverlayStats,
    on_complete: Option<CompleteCallback>,
}

impl<S: Surface, C: FrameClock> CelebrationOverlay<S, C> {
    pub fn new(config: OverlayConfig, clock: C, seed: u64) -> Self {
        Self {
            config,
            seed,
            clock,
            surface: None,
            context: None,
            store: None,
            reveal: None,
            stars: None,
            session: OverlaySession::default(),
            pending: None,
            alive: false,
            stats: OverlayStats::default(),
            on_complete: None,
        }
    }

    /// Called once each time the overlay returns to idle by finishing its fade
    pub fn set_on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Attach a surface. Nothing ticks until `play`.
    pub fn mount(&mut self, mut surface: S, logical: Bounds, pixel_ratio: f32) -> Result<(), SurfaceError> {
        if self.alive {
            self.unmount();
        }
        let context = SurfaceContext::new(logical, pixel_ratio);
        if let Err(e) = surface.configure(context) {
            log::warn!("celebration overlay not mounted: {}", e);
            return Err(e);
        }
        self.surface = Some(surface);
        self.context = Some(context);
        self.alive = true;
        log::debug!("celebration overlay mounted at {}x{}", logical.width, logical.height);
        Ok(())
    }

    /// Start a burst. Ignored unless mounted and idle.
    pub fn play(&mut self, now: f64) -> bool {
        if !self.alive || self.session.status != OverlayStatus::Idle {
            log::debug!("play ignored while {}", self.session.status.as_str());
            return false;
        }
        let Some(context) = self.context else {
            return false;
        };

        self.initialize(context.logical);
        let seed = self.seed.wrapping_add(self.stats.initializations as u64);
        self.reveal = Some(Reveal::new(&self.config, now, seed));
        self.stars = Some(StarBurst::new(
            STAR_BURST_COUNT,
            &self.config.palette,
            context.logical,
            now,
            !seed,
        ));
        self.session = OverlaySession {
            status: OverlayStatus::Playing,
            started_at: now,
            auto_stop_at: Some(now + self.config.duration_ms.max(0.0)),
            fade_started_at: now,
            fade_from: 0.0,
        };
        self.stats.timers_armed += 1;
        self.subscribe();

        log::info!(
            "celebration started: {} pieces, auto-stop in {} ms",
            self.config.population,
            self.config.duration_ms
        );
        true
    }

    /// Begin the fade-out. Only meaningful while playing.
    pub fn stop(&mut self, now: f64) -> bool {
        if self.session.status != OverlayStatus::Playing {
            return false;
        }
        self.begin_fade(now);
        true
    }

    pub fn on_frame(&mut self, now: f64) {
        self.pending = None;
        if !self.alive || self.session.status == OverlayStatus::Idle {
            return;
        }

        if self.session.status == OverlayStatus::Playing
            && self.session.auto_stop_at.is_some_and(|deadline| now >= deadline)
        {
            log::debug!("auto-stop deadline reached");
            self.begin_fade(now);
        }

        if self.session.status == OverlayStatus::Stopping
            && now - self.session.fade_started_at >= OVERLAY_FADE_OUT_MS
        {
            self.finish();
            return;
        }

        self.step(now);
        self.subscribe();
    }

    /// Overlay-wide opacity: fades in after `play`, out after `stop`
    pub fn overlay_opacity(&self, now: f64) -> f32 {
        match self.session.status {
            OverlayStatus::Idle => 0.0,
            OverlayStatus::Playing => {
                ((now - self.session.started_at) / OVERLAY_FADE_IN_MS).clamp(0.0, 1.0) as f32
            }
            OverlayStatus::Stopping => {
                let t = ((now - self.session.fade_started_at) / OVERLAY_FADE_OUT_MS).clamp(0.0, 1.0);
                self.session.fade_from * (1.0 - t as f32)
            }
        }
    }

    /// New pixel buffer; a running burst is respawned for the new bounds
    pub fn resize(&mut self, logical: Bounds, pixel_ratio: f32) {
        if !self.alive {
            return;
        }
        let context = SurfaceContext::new(logical, pixel_ratio);
        let result = match self.surface.as_mut() {
            Some(surface) => surface.configure(context),
            None => Err(SurfaceError::Detached),
        };
        if let Err(e) = result {
            log::warn!("surface lost on resize: {}", e);
            self.unmount();
            return;
        }
        self.context = Some(context);
        if self.session.status != OverlayStatus::Idle {
            self.initialize(logical);
        }
    }

    /// Tear down immediately. `on_complete` is not called.
    pub fn unmount(&mut self) -> Option<S> {
        self.alive = false;
        self.cancel_subscription();
        if self.session.status != OverlayStatus::Idle {
            log::debug!("celebration unmounted while {}", self.session.status.as_str());
        }
        self.session = OverlaySession::default();
        self.store = None;
        self.reveal = None;
        self.stars = None;
        self.context = None;
        self.surface.take()
    }

    pub fn is_mounted(&self) -> bool {
        self.alive
    }

    pub fn status(&self) -> OverlayStatus {
        self.session.status
    }

    pub fn session(&self) -> &OverlaySession {
        &self.session
    }

    pub fn stats(&self) -> OverlayStats {
        self.stats
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&EntityStore> {
        self.store.as_ref()
    }

    pub fn reveal(&self) -> Option<&Reveal> {
        self.reveal.as_ref()
    }

    pub fn stars(&self) -> Option<&StarBurst> {
        self.stars.as_ref()
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

    fn initialize(&mut self, bounds: Bounds) {
        self.stats.initializations += 1;
        self.store = Some(EntityStore::initialize(
            Variant::Celebration,
            self.config.population,
            &self.config.palette,
            bounds,
            self.seed.wrapping_add(self.stats.initializations as u64),
        ));
    }

    fn begin_fade(&mut self, now: f64) {
        self.session.fade_from = self.overlay_opacity(now);
        self.session.fade_started_at = now;
        self.session.auto_stop_at = None;
        self.session.status = OverlayStatus::Stopping;
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.freeze(now);
        }
    }

    fn finish(&mut self) {
        self.cancel_subscription();
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
        self.session = OverlaySession::default();
        self.store = None;
        self.reveal = None;
        self.stars = None;
        self.stats.completions += 1;
        log::info!("celebration complete after {} ticks", self.stats.ticks);
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
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

    fn step(&mut self, now: f64) {
        let alpha = self.overlay_opacity(now);
        let link_color = self
            .config
            .palette
            .first()
            .copied()
            .unwrap_or(Color::rgb(255, 255, 255));
        let style = FrameStyle::new(link_color).with_global_alpha(alpha);

        let (Some(store), Some(context)) = (self.store.as_mut(), self.context) else {
            return;
        };
        tick(store, &TickInput::default(), context.logical);
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.advance();
        }
        if let Some(stars) = self.stars.as_mut() {
            stars.advance(now);
        }
        if let Some(surface) = self.surface.as_mut() {
            let backdrop = self.stars.as_ref().map(StarBurst::stars).unwrap_or_default();
            draw_layered_frame(surface, backdrop, store.entities(), &[], &style);
        }
        self.stats.ticks += 1;
    }
}

impl<S: Surface, C: FrameClock> Drop for CelebrationOverlay<S, C> {
    fn drop(&mut self) {
        self.alive = false;
        self.cancel_subscription();
    }
}
