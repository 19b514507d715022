// ReqScope - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, serde_json, regex, chrono.
// Must NOT depend on: ui, platform, app, or any I/O crate directly.

pub mod content;
pub mod export;
pub mod filter;
pub mod html;
pub mod listing;
pub mod model;
