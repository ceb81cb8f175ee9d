//! Kairos App: WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It resolves configuration and storage, builds the platform adapters and
//! hands them to the egui UI.

mod app;

use kairos_platform::env::resolve_config;
use kairos_platform::storage::auto_detect_storage;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const CANVAS_ID: &str = "kairos_canvas";

/// WASM entry point, called from index.html
#[wasm_bindgen(start)]
pub async fn main() {
    let config = resolve_config();

    let level = if config.debug { log::Level::Debug } else { log::Level::Info };
    wasm_logger::init(wasm_logger::Config::new(level));
    log::info!("Kairos kiosk starting, backend at {}", config.base_url());

    let storage = auto_detect_storage().await;

    let web_options = eframe::WebOptions::default();

    let document = web_sys::window()
        .expect("No window")
        .document()
        .expect("No document");
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .expect("No canvas element with id 'kairos_canvas'")
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .expect("Element is not a canvas");

    wasm_bindgen_futures::spawn_local(async move {
        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(app::KioskApp::new(cc, config, storage)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}
