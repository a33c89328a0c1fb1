// WASM bindings: the `ProductViewer` class exported to JavaScript.
// Wires DOM input to the core, drives readiness, and forwards viewer events to JS callbacks
// after the core's borrow is released so callbacks may call back into the viewer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlElement};

use crate::animation::DEFAULT_DURATION_MS;
use crate::dom::{pointer_x, DomScheduler, DomSurface, ImagePreloader};
use crate::easing::{CubicBezier, Easing};
use crate::error::ViewerError;
use crate::events::{EventBus, ListenerId};
use crate::preload::preload_all;
use crate::types::{EventKind, ViewerConfig, ViewerEvent};
use crate::viewer::{Phase, RotationViewer};

type DomViewer = RotationViewer<DomSurface, DomScheduler>;
type Readiness = Shared<LocalBoxFuture<'static, Result<(), ViewerError>>>;

fn to_js(err: ViewerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

struct ViewerHost {
    viewer: RefCell<DomViewer>,
    /// Events emitted by the core, waiting for delivery to JS.
    outbox: Rc<RefCell<Vec<ViewerEvent>>>,
    js_bus: RefCell<EventBus>,
    bindings: RefCell<Vec<EventListener>>,
}

impl ViewerHost {
    fn with_viewer<R>(&self, f: impl FnOnce(&mut DomViewer) -> R) -> R {
        let result = f(&mut self.viewer.borrow_mut());
        self.flush();
        result
    }

    fn flush(&self) {
        loop {
            let pending = std::mem::take(&mut *self.outbox.borrow_mut());
            if pending.is_empty() {
                break;
            }
            for event in pending {
                let listeners = self.js_bus.borrow().listeners_for(event.kind());
                for listener in listeners {
                    listener(&event);
                }
            }
        }
    }

    fn tick(&self) {
        self.with_viewer(|viewer| viewer.tick());
    }

    fn finish_loading(self: &Rc<Self>, result: &Result<(), ViewerError>) {
        match result {
            Ok(()) => {
                let phase = self.viewer.borrow().phase();
                if phase != Phase::Loading {
                    log::debug!("Frames loaded in phase {:?}; not attaching handlers", phase);
                    return;
                }
                // Handlers go in before `loaded` fires, so a listener that destroys the
                // viewer also removes them.
                self.attach_bindings();
                if let Err(err) = self.with_viewer(|viewer| viewer.mark_ready()) {
                    log::debug!("Frames loaded after teardown: {}", err);
                    self.bindings.borrow_mut().clear();
                }
            }
            Err(err) => self.with_viewer(|viewer| viewer.mark_failed(err)),
        }
    }

    fn attach_bindings(self: &Rc<Self>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window; interaction disabled");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document; interaction disabled");
            return;
        };
        let container: HtmlElement = self.viewer.borrow().surface().container().clone();

        let mut bindings = Vec::with_capacity(6);
        let press_options = EventListenerOptions::enable_prevent_default();
        for event_type in ["mousedown", "touchstart"] {
            bindings.push(self.listen(&container, event_type, press_options, |host, event| {
                // Keep the page from scrolling or selecting text while spinning.
                event.prevent_default();
                if let Some(x) = pointer_x(event) {
                    host.with_viewer(|viewer| viewer.press(x));
                }
            }));
        }
        for event_type in ["mouseup", "touchend"] {
            bindings.push(self.listen(&document, event_type, EventListenerOptions::default(), |host, _| {
                host.with_viewer(|viewer| viewer.release());
            }));
        }
        for event_type in ["mousemove", "touchmove"] {
            bindings.push(self.listen(&document, event_type, EventListenerOptions::default(), |host, event| {
                if let Some(x) = pointer_x(event) {
                    host.with_viewer(|viewer| viewer.pointer_move(x));
                }
            }));
        }

        *self.bindings.borrow_mut() = bindings;
        log::debug!("Interaction handlers attached");
    }

    fn listen(
        self: &Rc<Self>,
        target: &EventTarget,
        event_type: &'static str,
        options: EventListenerOptions,
        handler: fn(&ViewerHost, &Event),
    ) -> EventListener {
        let host: Weak<ViewerHost> = Rc::downgrade(self);
        EventListener::new_with_options(target, event_type, options, move |event| {
            if let Some(host) = host.upgrade() {
                handler(&host, event);
            }
        })
    }
}

/// 360° product viewer bound to a container element.
#[wasm_bindgen]
pub struct ProductViewer {
    host: Rc<ViewerHost>,
    ready: Readiness,
}

#[wasm_bindgen]
impl ProductViewer {
    /// Create a viewer from a container and a JSON config
    /// (`imagePath`, `filePrefix`, `fileExtension`, `numberOfImages`, `invertMovement`).
    /// Frames start preloading immediately; await `ready()` or listen for `loaded`.
    #[wasm_bindgen(constructor)]
    pub fn new(element: Option<HtmlElement>, config_json: &str) -> Result<ProductViewer, JsValue> {
        let element = element.ok_or_else(|| {
            to_js(ViewerError::InvalidConfig("container element is required".to_string()))
        })?;
        let config = ViewerConfig::from_json(config_json).map_err(to_js)?;

        let mut viewer = RotationViewer::new(&config, DomSurface::new(element), DomScheduler::new())
            .map_err(to_js)?;

        let outbox = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            let outbox = Rc::clone(&outbox);
            viewer.subscribe(kind, move |event| outbox.borrow_mut().push(event.clone()));
        }
        let frames = viewer.frames().clone();

        let host = Rc::new(ViewerHost {
            viewer: RefCell::new(viewer),
            outbox,
            js_bus: RefCell::new(EventBus::new()),
            bindings: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&host);
        host.viewer.borrow_mut().scheduler_mut().bind(move || {
            if let Some(host) = weak.upgrade() {
                host.tick();
            }
        });

        let weak = Rc::downgrade(&host);
        let ready: Readiness = async move {
            let result = preload_all(&ImagePreloader, &frames).await;
            if let Some(host) = weak.upgrade() {
                host.finish_loading(&result);
            }
            result
        }
        .boxed_local()
        .shared();
        wasm_bindgen_futures::spawn_local(ready.clone().map(|_| ()));

        Ok(ProductViewer { host, ready })
    }

    /// Resolves once every frame is loaded; rejects naming the frame that failed.
    pub fn ready(&self) -> js_sys::Promise {
        let ready = self.ready.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            ready.await.map(|_| JsValue::UNDEFINED).map_err(to_js)
        })
    }

    /// Subscribe to `loaded`, `press`, `release`, `index`, `delta`, `destroyed` or `error`.
    pub fn on(&self, event: &str, callback: js_sys::Function) -> Result<u32, JsValue> {
        let kind = EventKind::from_str(event).map_err(to_js)?;
        let id = self.host.js_bus.borrow_mut().subscribe(kind, move |event| {
            if let Err(err) = invoke(&callback, event) {
                log::error!("{} listener threw: {:?}", event.kind(), err);
            }
        });
        Ok(id.as_u32())
    }

    pub fn off(&self, id: u32) -> bool {
        self.host
            .js_bus
            .borrow_mut()
            .unsubscribe(ListenerId::from_u32(id))
    }

    /// Spin once around. Defaults: 1000ms, `EASE_OUT`.
    #[wasm_bindgen(js_name = animate360)]
    pub fn animate_360(&self, duration_ms: Option<f64>, easing: Option<String>) -> Result<(), JsValue> {
        let easing = match easing {
            Some(name) => Easing::from_str(&name).map_err(to_js)?,
            None => Easing::default(),
        };
        let duration_ms = duration_ms.unwrap_or(DEFAULT_DURATION_MS);
        self.host
            .with_viewer(|viewer| viewer.animate_360(duration_ms, easing))
            .map_err(to_js)
    }

    /// Spin once around with a custom `cubic-bezier(x1, y1, x2, y2)` curve.
    #[wasm_bindgen(js_name = animate360Bezier)]
    pub fn animate_360_bezier(
        &self,
        duration_ms: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> Result<(), JsValue> {
        let curve = CubicBezier::new(x1, y1, x2, y2).map_err(to_js)?;
        self.host
            .with_viewer(|viewer| viewer.animate_360(duration_ms, curve))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = stopAnimation)]
    pub fn stop_animation(&self) -> bool {
        self.host.with_viewer(|viewer| viewer.cancel_auto_rotation())
    }

    /// Show a frame directly. Returns `false` if it was already shown.
    #[wasm_bindgen(js_name = updateIndex)]
    pub fn update_index(&self, index: usize) -> Result<bool, JsValue> {
        self.host
            .with_viewer(|viewer| viewer.update_index(index))
            .map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn index(&self) -> usize {
        self.host.viewer.borrow().index()
    }

    #[wasm_bindgen(getter, js_name = numberOfImages)]
    pub fn number_of_images(&self) -> usize {
        self.host.viewer.borrow().number_of_frames()
    }

    #[wasm_bindgen(getter, js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.host.viewer.borrow().is_dragging()
    }

    #[wasm_bindgen(getter, js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.host.viewer.borrow().is_ready()
    }

    #[wasm_bindgen(getter, js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.host.viewer.borrow().is_animating()
    }

    /// Frame references as a JSON array.
    pub fn frames(&self) -> Result<String, JsValue> {
        let viewer = self.host.viewer.borrow();
        serde_json::to_string(viewer.frames().as_slice())
            .map_err(|e| to_js(ViewerError::from(e)))
    }

    /// Remove all handlers and the image node, stop any spin, emit `destroyed`.
    pub fn destroy(&self) -> Result<(), JsValue> {
        self.host.bindings.borrow_mut().clear();
        let result = self.host.with_viewer(|viewer| viewer.destroy());
        self.host.js_bus.borrow_mut().clear();
        result.map_err(to_js)
    }

    /// Names accepted by `animate360`, as a JSON array.
    pub fn easings() -> String {
        let names: Vec<&str> = Easing::ALL.iter().map(Easing::name).collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }
}

fn invoke(callback: &js_sys::Function, event: &ViewerEvent) -> Result<JsValue, JsValue> {
    let payload = match event.payload_json().map_err(to_js)? {
        Some(json) => js_sys::JSON::parse(&json)?,
        None => JsValue::UNDEFINED,
    };
    callback.call1(&JsValue::NULL, &payload)
}
