mod api;
mod app;
mod components;
mod config;
mod models;
mod pages;
mod session;
mod state;
mod telemetry;

pub use app::App;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    telemetry::init();
    tracing::info!(api_url = %config::EnvConfig::new().api_url, "starting users admin");
    mount_to_body(App);
}
