//! HTTP surface and wiring for the module engine.

pub mod api;
pub mod background;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
