//! Browser glue
//!
//! `RafClock` drives the schedulers from requestAnimationFrame. Handles own
//! every closure they register and remove them on `unmount`, so nothing
//! outlives the component that mounted it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent};

use super::ensure_initialized;
use crate::Bounds;
use crate::error::SurfaceError;
use crate::lifecycle::{CelebrationOverlay, FieldAnimator, FrameClock, FrameRequest, OverlayStatus};
use crate::renderer::{CanvasSurface, Surface};
use crate::settings::{FieldConfig, OverlayConfig};
use crate::sim::Variant;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// requestAnimationFrame-backed clock; clones share one callback slot
#[derive(Clone, Default)]
pub struct RafClock {
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl RafClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_callback(&self, f: impl FnMut(f64) + 'static) {
        *self.callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(f));
    }

    /// Drop the callback; later requests return `None`
    fn detach(&self) {
        self.callback.borrow_mut().take();
    }
}

impl FrameClock for RafClock {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let window = web_sys::window()?;
        let slot = self.callback.borrow();
        let callback = slot.as_ref()?;
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .ok()
            .map(FrameRequest)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(request.0);
        }
    }
}

/// An event listener that can be removed again
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(target: &EventTarget, kind: &'static str, f: impl FnMut(Event) + 'static) -> Self {
        let closure = Closure::<dyn FnMut(Event)>::new(f);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
            log::warn!("failed to listen for {}: {:?}", kind, e);
        }
        Self {
            target: target.clone(),
            kind,
            closure,
        }
    }

    fn detach(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn device_pixel_ratio() -> f32 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio() as f32)
        .unwrap_or(1.0)
}

fn seed() -> u64 {
    js_sys::Date::now() as u64
}

fn css_size(canvas: &HtmlCanvasElement) -> Bounds {
    let rect = canvas.get_bounding_client_rect();
    Bounds::new(rect.width() as f32, rect.height() as f32)
}

/// Canvas-local pointer position
fn local_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(
        (event.client_x() as f64 - rect.left()) as f32,
        (event.client_y() as f64 - rect.top()) as f32,
    )
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

type WebField = FieldAnimator<CanvasSurface, RafClock>;
type WebOverlay = CelebrationOverlay<CanvasSurface, RafClock>;

/// A mounted ambient field or network
#[wasm_bindgen]
pub struct FieldHandle {
    animator: Rc<RefCell<WebField>>,
    clock: RafClock,
    listeners: Vec<Listener>,
}

/// Mount a field onto the canvas with the given element id
pub fn mount_field(canvas_id: &str, config: FieldConfig, variant: Variant) -> Result<FieldHandle, SurfaceError> {
    ensure_initialized();

    let surface = CanvasSurface::from_element_id(canvas_id)?;
    let canvas = surface.element().clone();
    let logical = surface.css_size();

    let clock = RafClock::new();
    let animator = Rc::new(RefCell::new(FieldAnimator::new(config, variant, clock.clone(), seed())));
    let weak: Weak<RefCell<WebField>> = Rc::downgrade(&animator);
    clock.set_callback(move |timestamp| {
        if let Some(animator) = weak.upgrade() {
            animator.borrow_mut().on_frame(timestamp);
        }
    });

    if let Err(e) = animator.borrow_mut().mount(surface, logical, device_pixel_ratio()) {
        clock.detach();
        return Err(e);
    }

    let mut listeners = Vec::with_capacity(3);
    {
        let weak = Rc::downgrade(&animator);
        let target = canvas.clone();
        listeners.push(Listener::attach(&canvas, "mousemove", move |event: Event| {
            let (Some(animator), Some(event)) = (weak.upgrade(), event.dyn_ref::<MouseEvent>()) else {
                return;
            };
            animator.borrow_mut().pointer_moved(local_position(&target, event));
        }));
    }
    {
        let weak = Rc::downgrade(&animator);
        listeners.push(Listener::attach(&canvas, "mouseleave", move |_event: Event| {
            if let Some(animator) = weak.upgrade() {
                animator.borrow_mut().pointer_left();
            }
        }));
    }
    if let Some(window) = web_sys::window() {
        let weak = Rc::downgrade(&animator);
        let target = canvas.clone();
        listeners.push(Listener::attach(&window, "resize", move |_event: Event| {
            if let Some(animator) = weak.upgrade() {
                animator
                    .borrow_mut()
                    .resize(css_size(&target), device_pixel_ratio());
            }
        }));
    }

    Ok(FieldHandle {
        animator,
        clock,
        listeners,
    })
}

#[wasm_bindgen]
impl FieldHandle {
    /// Apply a JSON config; population or palette changes respawn the field
    pub fn reconfigure(&self, config_json: &str) -> Result<(), JsValue> {
        let config = FieldConfig::from_json(config_json).map_err(to_js)?;
        self.animator.borrow_mut().reconfigure(config);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn ticks(&self) -> f64 {
        self.animator.borrow().ticks() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.animator.borrow().is_mounted()
    }

    /// Cancel the pending frame and remove every listener
    pub fn unmount(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        self.animator.borrow_mut().unmount();
        self.clock.detach();
    }
}

impl Drop for FieldHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// DOM nodes the reveal writes into, all optional
struct RevealDom {
    root: Option<HtmlElement>,
    icon: Option<HtmlElement>,
    message: Option<HtmlElement>,
    sub_message: Option<HtmlElement>,
    counter: Option<HtmlElement>,
}

impl RevealDom {
    /// Looks for `[data-reveal=...]` children of the canvas' parent
    fn find(canvas: &HtmlCanvasElement) -> Self {
        let root = canvas.parent_element();
        let part = |name: &str| -> Option<HtmlElement> {
            root.as_ref()?
                .query_selector(&format!("[data-reveal=\"{name}\"]"))
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        };
        Self {
            icon: part("icon"),
            message: part("message"),
            sub_message: part("sub-message"),
            counter: part("counter"),
            root: root.and_then(|el: Element| el.dyn_into::<HtmlElement>().ok()),
        }
    }

    fn sync(&self, overlay: &WebOverlay, now: f64) {
        let style = |el: &Option<HtmlElement>, prop: &str, value: &str| {
            if let Some(el) = el {
                let _ = el.style().set_property(prop, value);
            }
        };

        if overlay.status() == OverlayStatus::Idle {
            style(&self.root, "display", "none");
            return;
        }
        style(&self.root, "display", "flex");
        style(&self.root, "opacity", &overlay.overlay_opacity(now).to_string());

        let Some(reveal) = overlay.reveal() else {
            return;
        };
        let frame = reveal.frame(now);
        style(
            &self.icon,
            "transform",
            &format!("scale({}) rotate({}deg)", frame.icon_scale, frame.icon_rotation),
        );
        for (el, block) in [(&self.message, frame.message), (&self.sub_message, frame.sub_message)] {
            style(el, "opacity", &block.opacity.to_string());
            style(
                el,
                "transform",
                &format!("translateY({}px) scale({})", block.offset_y, block.scale),
            );
        }
        if let Some(el) = &self.message {
            el.set_text_content(Some(&reveal.headline()));
        }
        if let Some(el) = &self.sub_message {
            el.set_text_content(Some(reveal.sub_message()));
        }
        if let (Some(el), Some(text)) = (&self.counter, reveal.counter_text(now)) {
            el.set_text_content(Some(&text));
        }
    }
}

/// A mounted celebration overlay
#[wasm_bindgen]
pub struct OverlayHandle {
    overlay: Rc<RefCell<WebOverlay>>,
    clock: RafClock,
    listeners: Vec<Listener>,
    on_complete: Rc<RefCell<Option<js_sys::Function>>>,
}

/// Mount an overlay onto the canvas with the given element id
pub fn mount_overlay(canvas_id: &str, config: OverlayConfig) -> Result<OverlayHandle, SurfaceError> {
    ensure_initialized();

    let surface = CanvasSurface::from_element_id(canvas_id)?;
    let canvas = surface.element().clone();
    let logical = surface.css_size();

    let clock = RafClock::new();
    let overlay = Rc::new(RefCell::new(CelebrationOverlay::new(config, clock.clone(), seed())));

    // Completion is flagged inside the frame and reported after the borrow
    // ends, so the JS callback may call back into the handle.
    let completed = Rc::new(Cell::new(false));
    {
        let completed = completed.clone();
        overlay
            .borrow_mut()
            .set_on_complete(move || completed.set(true));
    }

    let on_complete: Rc<RefCell<Option<js_sys::Function>>> = Rc::new(RefCell::new(None));
    let dom = RevealDom::find(&canvas);
    {
        let weak = Rc::downgrade(&overlay);
        let on_complete = on_complete.clone();
        clock.set_callback(move |timestamp| {
            let Some(overlay) = weak.upgrade() else {
                return;
            };
            {
                let mut overlay = overlay.borrow_mut();
                overlay.on_frame(timestamp);
                dom.sync(&overlay, timestamp);
            }
            if completed.replace(false) {
                let callback = on_complete.borrow().clone();
                if let Some(callback) = callback {
                    if let Err(e) = callback.call0(&JsValue::NULL) {
                        log::warn!("onComplete threw: {:?}", e);
                    }
                }
            }
        });
    }

    if let Err(e) = overlay
        .borrow_mut()
        .mount(surface, logical, device_pixel_ratio())
    {
        clock.detach();
        return Err(e);
    }

    let mut listeners = Vec::with_capacity(1);
    if let Some(window) = web_sys::window() {
        let weak = Rc::downgrade(&overlay);
        let target = canvas.clone();
        listeners.push(Listener::attach(&window, "resize", move |_event: Event| {
            if let Some(overlay) = weak.upgrade() {
                overlay
                    .borrow_mut()
                    .resize(css_size(&target), device_pixel_ratio());
            }
        }));
    }

    Ok(OverlayHandle {
        overlay,
        clock,
        listeners,
        on_complete,
    })
}

#[wasm_bindgen]
impl OverlayHandle {
    /// Start a burst; false if one is already running
    pub fn play(&self) -> bool {
        self.overlay.borrow_mut().play(now_ms())
    }

    pub fn stop(&self) -> bool {
        self.overlay.borrow_mut().stop(now_ms())
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.overlay.borrow().status().as_str().to_string()
    }

    #[wasm_bindgen(js_name = setOnComplete)]
    pub fn set_on_complete(&self, callback: Option<js_sys::Function>) {
        *self.on_complete.borrow_mut() = callback;
    }

    /// Tear down without firing `onComplete`
    pub fn unmount(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        if let Some(mut surface) = self.overlay.borrow_mut().unmount() {
            surface.clear();
        }
        self.on_complete.borrow_mut().take();
        self.clock.detach();
    }
}

impl Drop for OverlayHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Mount an ambient field (`"ambient"`) or pointer network (`"network"`)
#[wasm_bindgen(js_name = mountField)]
pub fn mount_field_js(canvas_id: &str, variant: &str, config_json: Option<String>) -> Result<FieldHandle, JsValue> {
    let variant = match Variant::parse(variant) {
        Some(Variant::Celebration) | None => {
            return Err(to_js(format!("unknown field variant '{variant}'")));
        }
        Some(v) => v,
    };
    let config = match config_json.as_deref() {
        Some(json) => FieldConfig::from_json(json).map_err(to_js)?,
        None if variant == Variant::Ambient => FieldConfig::ambient(),
        None => FieldConfig::default(),
    };
    mount_field(canvas_id, config, variant).map_err(to_js)
}

#[wasm_bindgen(js_name = mountOverlay)]
pub fn mount_overlay_js(canvas_id: &str, config_json: Option<String>) -> Result<OverlayHandle, JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => OverlayConfig::from_json(json).map_err(to_js)?,
        None => OverlayConfig::default(),
    };
    mount_overlay(canvas_id, config).map_err(to_js)
}
