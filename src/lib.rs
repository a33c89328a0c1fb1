// product_viewer: 360° product viewer for the browser, Rust/WASM.
// The headless core (viewer, interaction, animation) holds all logic; dom + bindings are plumbing.

mod animation;
mod bindings;
mod dom;
mod easing;
mod error;
mod events;
mod frames;
mod interaction;
mod logging;
mod preload;
mod types;
mod viewer;

use wasm_bindgen::prelude::*;

pub use animation::{AutoRotation, Tick, DEFAULT_DURATION_MS};
pub use bindings::ProductViewer;
pub use dom::{pointer_x, DomScheduler, DomSurface, ImagePreloader};
pub use easing::{CubicBezier, Easing, TimingFunction};
pub use error::ViewerError;
pub use events::{EventBus, Listener, ListenerId};
pub use frames::FrameSet;
pub use interaction::{wrap_index, DragMapper, DragState, DragStep};
pub use preload::{preload_all, FramePreloader};
pub use types::*;
pub use viewer::{
    Phase, RotationViewer, Scheduler, Surface, CONTAINER_CLASS, IMAGE_CLASS, PRESS_ACTIVE_CLASS,
};

/// Initialize panic hook and console logging for the browser.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init(log::LevelFilter::Info);
}

/// Change the console log level (`error`, `warn`, `info`, `debug`, `trace`, `off`).
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: log::LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("Invalid log level: {}", level)))?;
    log::set_max_level(filter);
    Ok(())
}
