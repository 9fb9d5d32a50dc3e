//! HTTP handlers for the Filament Inventory API

pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod labels;
pub mod locations;
pub mod orders;
pub mod products;

pub use dashboard::*;
pub use health::*;
pub use inventory::*;
pub use labels::*;
pub use locations::*;
pub use orders::*;
pub use products::*;
