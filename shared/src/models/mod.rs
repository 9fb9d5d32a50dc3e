//! Domain models for the Filament Inventory service

mod inventory;
mod label;
mod location;
mod order;
mod product;

pub use inventory::*;
pub use label::*;
pub use location::*;
pub use order::*;
pub use product::*;
