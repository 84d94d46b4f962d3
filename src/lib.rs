//! GuessDle front-end crate.
//!
//! Drives the play page of a guessing game: the live attempt feed with its flip
//! reveal and victory flow, and the autocomplete on the guess input. The server
//! stays the source of truth for scoring and win state; this crate only renders
//! what it answers. JS calls `start_game_page()` once the DOM is ready.

use wasm_bindgen::prelude::*;

pub mod autocomplete;
pub mod config;
pub mod dom;
pub mod error;
pub mod feed;
pub mod model;

pub use error::GameError;
pub use model::{Attempt, CellState, FeedbackCell, GuessResponse, IdentityDisplay};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[cfg(debug_assertions)]
const LOG_LEVEL: log::Level = log::Level::Debug;
#[cfg(not(debug_assertions))]
const LOG_LEVEL: log::Level = log::Level::Info;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (e.g. tests) keeps the first logger.
    let _ = console_log::init_with_level(LOG_LEVEL);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start both controllers. Autocomplete failures do not keep the feed from running.
#[wasm_bindgen]
pub fn start_game_page() -> Result<(), JsValue> {
    if let Err(err) = autocomplete::start() {
        log::error!("autocomplete unavailable: {err}");
    }
    start_attempt_feed()
}

#[wasm_bindgen]
pub fn start_attempt_feed() -> Result<(), JsValue> {
    feed::start().map_err(JsValue::from)
}

#[wasm_bindgen]
pub fn start_autocomplete() -> Result<(), JsValue> {
    autocomplete::start().map_err(JsValue::from)
}
