//! # client
//!
//! Leptos + WASM admin console for propdesk (hotels, rooms, bookings,
//! properties, investments, notifications).
//!
//! Every screen except login sits behind `ProtectedLayout`, which binds the
//! `gate` crate's session store, verifier, and navigation guard to the router.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    // Session gate events are emitted through `tracing`'s `log` bridge.
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
