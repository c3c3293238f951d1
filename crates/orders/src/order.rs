use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{InvoiceId, OrderId, UserId};

/// Marketplace order status lifecycle (as seen by the dispute engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Closed,
    Cancelled,
}

/// Exception flags raised on an order by downstream workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderException {
    DisputeFiled,
}

/// Read model of a marketplace order.
///
/// The dispute engine never mutates orders beyond exception flagging; it
/// snapshots the fields it needs at dispute creation so the case stays stable
/// even if the order record later changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub buyer_name: String,
    pub seller_name: String,
    pub item_name: String,
    pub quantity: u32,
    /// Whole currency units.
    pub unit_price: u64,
    /// Whole currency units.
    pub total_price: u64,
    pub status: OrderStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub has_exception: bool,
    pub exception_type: Option<OrderException>,
}

impl OrderRecord {
    /// Disputes can only be opened on delivered (or delivered-then-closed)
    /// orders.
    pub fn is_disputable(&self) -> bool {
        matches!(self.status, OrderStatus::Delivered | OrderStatus::Closed)
    }
}

/// Read model of the invoice linked to an order, referenced from dispute
/// detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub order_id: OrderId,
    pub invoice_number: String,
}
