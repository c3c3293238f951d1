//! `tradepost-infra` — repository implementations for the dispute engine.

pub mod in_memory;


pub use in_memory::InMemoryRepository;
