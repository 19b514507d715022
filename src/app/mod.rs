// ReqScope - app/mod.rs
//
// Application layer: log sources, background polling, state, session.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod poller;
pub mod session;
pub mod source;
pub mod state;
