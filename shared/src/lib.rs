//! Shared types and rules for the Filament Inventory service
//!
//! This crate contains the domain model and the pure lifecycle/label rules
//! shared between the backend, the browser (via WASM), and tests.

pub mod lifecycle;
pub mod models;
pub mod validation;

pub use lifecycle::*;
pub use models::*;
pub use validation::*;
