// Browser tests: run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use product_viewer::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{HtmlElement, MouseEvent, MouseEventInit};

wasm_bindgen_test_configure!(run_in_browser);

fn container(width_px: u32) -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let element: HtmlElement = document.create_element("div").unwrap().unchecked_into();
    element
        .style()
        .set_property("width", &format!("{}px", width_px))
        .unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

// Each frame decodes to `<svg .../><!--/imgNN-->`, a valid image, so preloading succeeds.
const SVG_FRAMES: &str = "data:image/svg+xml,%3Csvg%20xmlns%3D%27http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%27%20width%3D%2710%27%20height%3D%2710%27%2F%3E%3C!--";

fn svg_viewer(element: &HtmlElement, frames: usize) -> ProductViewer {
    let config = serde_json::json!({
        "imagePath": SVG_FRAMES,
        "fileExtension": "--%3E",
        "numberOfImages": frames,
    });
    ProductViewer::new(Some(element.clone()), &config.to_string()).unwrap()
}

/// Subscribe to `event` and collect every payload delivered.
fn record(viewer: &ProductViewer, event: &str) -> Rc<RefCell<Vec<JsValue>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let callback = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
        sink.borrow_mut().push(payload);
    });
    viewer
        .on(event, callback.into_js_value().unchecked_into())
        .unwrap();
    seen
}

fn field(payload: &JsValue, name: &str) -> JsValue {
    js_sys::Reflect::get(payload, &JsValue::from_str(name)).unwrap()
}

fn mouse(target: &web_sys::EventTarget, event_type: &str, x: i32) {
    let init = MouseEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    init.set_client_x(x);
    let event = MouseEvent::new_with_mouse_event_init_dict(event_type, &init).unwrap();
    target.dispatch_event(&event).unwrap();
}

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn dom_surface_renders_frames_and_classes() {
    let element = container(360);
    let config = ViewerConfig::new("frames");
    let mut viewer =
        RotationViewer::new(&config, DomSurface::new(element.clone()), DomScheduler::new()).unwrap();
    assert!(element.class_list().contains(CONTAINER_CLASS));

    viewer.mark_ready().unwrap();
    let image = viewer.surface().image().unwrap().clone();
    assert!(image.src().ends_with("frames/img01.jpg"));
    assert!(image.class_list().contains(IMAGE_CLASS));

    viewer.press(100.0);
    assert!(element.class_list().contains(PRESS_ACTIVE_CLASS));
    viewer.pointer_move(200.0);
    assert_eq!(viewer.index(), 10);
    assert!(image.src().ends_with("frames/img11.jpg"));
    viewer.release();
    assert!(!element.class_list().contains(PRESS_ACTIVE_CLASS));

    viewer.destroy().unwrap();
    assert_eq!(element.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn missing_container_is_rejected() {
    assert!(ProductViewer::new(None, r#"{"imagePath":"frames"}"#).is_err());
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    let element = container(100);
    assert!(ProductViewer::new(Some(element.clone()), r#"{"imagePath":""}"#).is_err());
    assert!(ProductViewer::new(Some(element), "not json").is_err());
}

#[wasm_bindgen_test]
fn unknown_event_names_are_rejected() {
    let viewer = ProductViewer::new(Some(container(100)), r#"{"imagePath":"frames"}"#).unwrap();
    let noop = js_sys::Function::new_no_args("");
    assert!(viewer.on("spin", noop.clone()).is_err());
    assert!(viewer.on("index", noop).is_ok());
}

#[wasm_bindgen_test]
async fn missing_frames_reject_readiness() {
    let viewer = ProductViewer::new(
        Some(container(100)),
        r#"{"imagePath":"/does-not-exist","numberOfImages":3}"#,
    )
    .unwrap();

    let errors = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&errors);
    let on_error = Closure::<dyn Fn(JsValue)>::new(move |_payload: JsValue| {
        *sink.borrow_mut() += 1;
    });
    viewer
        .on("error", on_error.as_ref().unchecked_ref::<js_sys::Function>().clone())
        .unwrap();

    let result = JsFuture::from(viewer.ready()).await;
    assert!(result.is_err());
    assert!(!viewer.is_ready());
    assert_eq!(*errors.borrow(), 1);
    assert!(viewer.animate_360(None, None).is_err());
}

#[wasm_bindgen_test]
async fn drag_delivers_parsed_payloads() {
    let element = container(360);
    let viewer = svg_viewer(&element, 36);
    let loaded = record(&viewer, "loaded");
    let presses = record(&viewer, "press");
    let deltas = record(&viewer, "delta");
    let indices = record(&viewer, "index");
    let releases = record(&viewer, "release");

    JsFuture::from(viewer.ready()).await.unwrap();
    assert!(viewer.is_ready());
    assert_eq!(loaded.borrow().len(), 1);
    assert_eq!(element.child_element_count(), 1);

    mouse(&element, "mousedown", 100);
    assert!(viewer.is_dragging());
    assert_eq!(presses.borrow().len(), 1);
    assert!(element.class_list().contains(PRESS_ACTIVE_CLASS));

    mouse(&document(), "mousemove", 200);
    assert_eq!(viewer.index(), 10);
    assert_eq!(indices.borrow().len(), 1);
    assert_eq!(indices.borrow()[0].as_f64(), Some(10.0));
    let delta = deltas.borrow()[0].clone();
    assert_eq!(field(&delta, "x").as_f64(), Some(100.0));
    assert_eq!(field(&delta, "numberOfImages").as_f64(), Some(36.0));
    assert_eq!(field(&delta, "offsetIndex").as_f64(), Some(10.0));

    mouse(&document(), "mouseup", 200);
    assert!(!viewer.is_dragging());
    assert!(!element.class_list().contains(PRESS_ACTIVE_CLASS));
    let release = releases.borrow()[0].clone();
    assert_eq!(field(&release, "index").as_f64(), Some(10.0));
    assert!(field(&release, "image")
        .as_string()
        .unwrap()
        .ends_with("img11--%3E"));

    viewer.destroy().unwrap();
}

#[wasm_bindgen_test]
async fn destroyed_viewer_ignores_pointer_input() {
    let element = container(360);
    let viewer = svg_viewer(&element, 36);
    JsFuture::from(viewer.ready()).await.unwrap();

    let destroyed = record(&viewer, "destroyed");
    let presses = record(&viewer, "press");
    let indices = record(&viewer, "index");
    viewer.destroy().unwrap();
    assert_eq!(destroyed.borrow().len(), 1);
    assert_eq!(element.child_element_count(), 0);

    mouse(&element, "mousedown", 100);
    mouse(&document(), "mousemove", 300);
    mouse(&document(), "mouseup", 300);

    assert!(presses.borrow().is_empty());
    assert!(indices.borrow().is_empty());
    assert!(!viewer.is_dragging());
    assert!(!element.class_list().contains(PRESS_ACTIVE_CLASS));
    assert_eq!(viewer.index(), 0);
    assert!(viewer.destroy().is_err());
}

#[wasm_bindgen_test]
async fn destroy_from_loaded_callback_stops_interaction() {
    let element = container(360);
    let viewer = Rc::new(svg_viewer(&element, 36));
    let weak = Rc::downgrade(&viewer);
    let on_loaded = Closure::<dyn Fn(JsValue)>::new(move |_: JsValue| {
        if let Some(viewer) = weak.upgrade() {
            viewer.destroy().unwrap();
        }
    });
    viewer
        .on("loaded", on_loaded.into_js_value().unchecked_into())
        .unwrap();

    JsFuture::from(viewer.ready()).await.unwrap();
    assert!(!viewer.is_ready());
    assert_eq!(element.child_element_count(), 0);

    mouse(&element, "mousedown", 100);
    mouse(&document(), "mousemove", 300);
    assert!(!viewer.is_dragging());
    assert!(!element.class_list().contains(PRESS_ACTIVE_CLASS));
    assert_eq!(viewer.index(), 0);
}

#[wasm_bindgen_test]
async fn release_callback_can_start_a_spin() {
    let element = container(360);
    let viewer = Rc::new(svg_viewer(&element, 36));
    JsFuture::from(viewer.ready()).await.unwrap();

    let weak = Rc::downgrade(&viewer);
    let on_release = Closure::<dyn Fn(JsValue)>::new(move |_: JsValue| {
        if let Some(viewer) = weak.upgrade() {
            viewer
                .animate_360(Some(1000.0), Some("EASE_LINEAR".to_string()))
                .unwrap();
        }
    });
    viewer
        .on("release", on_release.into_js_value().unchecked_into())
        .unwrap();

    mouse(&element, "mousedown", 100);
    mouse(&document(), "mouseup", 100);
    assert!(viewer.is_animating());
    assert!(viewer.stop_animation());
    assert!(!viewer.is_animating());

    viewer.destroy().unwrap();
}

#[wasm_bindgen_test]
async fn release_callback_can_destroy() {
    let element = container(360);
    let viewer = Rc::new(svg_viewer(&element, 36));
    JsFuture::from(viewer.ready()).await.unwrap();
    let destroyed = record(&viewer, "destroyed");

    let weak = Rc::downgrade(&viewer);
    let on_release = Closure::<dyn Fn(JsValue)>::new(move |_: JsValue| {
        if let Some(viewer) = weak.upgrade() {
            viewer.destroy().unwrap();
        }
    });
    viewer
        .on("release", on_release.into_js_value().unchecked_into())
        .unwrap();

    mouse(&element, "mousedown", 100);
    mouse(&document(), "mouseup", 100);
    assert_eq!(destroyed.borrow().len(), 1);
    assert_eq!(element.child_element_count(), 0);

    mouse(&element, "mousedown", 100);
    assert!(!viewer.is_dragging());
}
