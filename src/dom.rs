// Browser implementations of the viewer seams: container surface, interval timer, image preloader.

use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use gloo::timers::callback::Interval;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlElement, HtmlImageElement, MouseEvent, TouchEvent};

use crate::error::ViewerError;
use crate::preload::FramePreloader;
use crate::viewer::{Scheduler, Surface, IMAGE_CLASS};

/// The host container element plus the image node the viewer appends to it.
pub struct DomSurface {
    container: HtmlElement,
    image: Option<HtmlImageElement>,
}

impl DomSurface {
    pub fn new(container: HtmlElement) -> Self {
        DomSurface {
            container,
            image: None,
        }
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    pub fn image(&self) -> Option<&HtmlImageElement> {
        self.image.as_ref()
    }
}

impl Surface for DomSurface {
    fn add_class(&mut self, class: &str) {
        if let Err(err) = self.container.class_list().add_1(class) {
            log::warn!("Could not add class {}: {:?}", class, err);
        }
    }

    fn remove_class(&mut self, class: &str) {
        if let Err(err) = self.container.class_list().remove_1(class) {
            log::warn!("Could not remove class {}: {:?}", class, err);
        }
    }

    fn width(&self) -> f64 {
        self.container.offset_width() as f64
    }

    fn mount_image(&mut self, frame: &str) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                log::error!("Could not create image node: {:?}", err);
                return;
            }
        };
        image.set_src(frame);
        if let Err(err) = image.class_list().add_1(IMAGE_CLASS) {
            log::warn!("Could not tag image node: {:?}", err);
        }
        if let Err(err) = self.container.append_child(&image) {
            log::error!("Could not append image node: {:?}", err);
            return;
        }
        self.image = Some(image);
    }

    fn show_frame(&mut self, frame: &str) {
        if let Some(image) = &self.image {
            image.set_src(frame);
        }
    }

    fn unmount_image(&mut self) {
        if let Some(image) = self.image.take() {
            if let Err(err) = self.container.remove_child(&image) {
                log::warn!("Image node already detached: {:?}", err);
            }
        }
    }
}

/// `setInterval`-backed scheduler. The tick callback is bound once the viewer is shared.
#[derive(Default)]
pub struct DomScheduler {
    on_tick: Option<Rc<dyn Fn()>>,
    interval: Option<Interval>,
}

impl DomScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, on_tick: impl Fn() + 'static) {
        self.on_tick = Some(Rc::new(on_tick));
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }
}

impl Scheduler for DomScheduler {
    fn start(&mut self, period_ms: f64) {
        self.cancel();
        let Some(on_tick) = self.on_tick.clone() else {
            log::warn!("Scheduler started before a tick callback was bound");
            return;
        };
        let millis = period_ms.round().clamp(1.0, u32::MAX as f64) as u32;
        self.interval = Some(Interval::new(millis, move || on_tick()));
    }

    fn cancel(&mut self) {
        if let Some(interval) = self.interval.take() {
            // Cancel may run inside this interval's own callback; drop the closure later.
            let callback = interval.cancel();
            wasm_bindgen_futures::spawn_local(async move {
                drop(callback);
            });
        }
    }
}

/// Loads frames through `HtmlImageElement`, resolving on `load` and failing on `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreloader;

impl FramePreloader for ImagePreloader {
    type Load = LocalBoxFuture<'static, Result<(), ViewerError>>;

    fn load(&self, frame: &str) -> Self::Load {
        let frame = frame.to_string();
        async move {
            let image = HtmlImageElement::new().map_err(|err| preload_error(&frame, err))?;
            let loaded = js_sys::Promise::new(&mut |resolve, reject| {
                image.set_onload(Some(&resolve));
                image.set_onerror(Some(&reject));
            });
            image.set_src(&frame);

            let result = JsFuture::from(loaded).await;
            image.set_onload(None);
            image.set_onerror(None);
            result.map_err(|err| preload_error(&frame, err))?;
            Ok(())
        }
        .boxed_local()
    }
}

fn preload_error(frame: &str, err: JsValue) -> ViewerError {
    let reason = err
        .as_string()
        .unwrap_or_else(|| "image could not be fetched or decoded".to_string());
    ViewerError::PreloadFailed {
        frame: frame.to_string(),
        reason,
    }
}

/// Horizontal page position of a mouse or single-touch event.
pub fn pointer_x(event: &Event) -> Option<f64> {
    // Checked by type name: `TouchEvent` is not defined in every desktop browser.
    if event.type_().starts_with("touch") {
        let touch_event = event.unchecked_ref::<TouchEvent>();
        touch_event
            .touches()
            .get(0)
            .map(|touch| touch.page_x() as f64)
    } else {
        event
            .dyn_ref::<MouseEvent>()
            .map(|mouse| mouse.page_x() as f64)
    }
}
