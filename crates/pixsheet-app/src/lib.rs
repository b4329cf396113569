//! Pixsheet Application
//!
//! The editor session wiring the sheet model, services and canvas
//! controllers together, plus the browser entry point.

mod app;
mod shortcuts;

pub use app::{Editor, EditorSurfaces, loading_message};
pub use shortcuts::{Action, KeyManager, Shortcut};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
