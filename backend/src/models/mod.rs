//! Domain models used by the backend
//!
//! Re-exports the shared domain crate: models and lifecycle rules

pub use shared::lifecycle::*;
pub use shared::models::*;
