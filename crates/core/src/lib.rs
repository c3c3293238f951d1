//! `tradepost-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod pagination;

pub use error::{DomainError, DomainResult};
pub use id::{DisputeId, EventId, EvidenceId, InvoiceId, OrderId, UserId};
pub use pagination::Pagination;
