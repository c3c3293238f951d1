//! `tradepost-orders` — order and invoice read models consumed by the
//! dispute workflow engine.

pub mod order;

pub use order::{InvoiceRecord, OrderException, OrderRecord, OrderStatus};
