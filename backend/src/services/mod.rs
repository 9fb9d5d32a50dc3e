//! Business logic services for the Filament Inventory service

pub mod dashboard;
pub mod inventory;
pub mod label;
pub mod location;
pub mod order;
pub mod product;

pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use label::LabelService;
pub use location::LocationService;
pub use order::OrderService;
pub use product::ProductService;
