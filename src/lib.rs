//! # lms-client
//!
//! Leptos + WASM frontend for the learning platform: login and registration,
//! dashboards, the course catalog with enrollment, progress tracking, and
//! course editing for instructors.
//!
//! The interesting part is the session layer in [`state`] and [`net`]: a
//! persisted token store, an auth state machine with an event bus, and an
//! interceptor that refreshes an expired access token once and retries,
//! coalescing concurrent refreshes into a single request.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("console logger unavailable: {err}").into());
    }
    leptos::mount::mount_to_body(app::App);
}
