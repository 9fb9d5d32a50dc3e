//! External integrations: barcode rendering and the network label printer

pub mod barcode;
pub mod brother_ql;

pub use barcode::{encode_barcode, render_label, LabelError, LabelImage};
pub use brother_ql::{LabelPrinter, PrintDispatch};
