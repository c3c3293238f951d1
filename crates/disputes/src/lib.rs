//! `tradepost-disputes` — the dispute workflow engine.
//!
//! A governed, auditable lifecycle for buyer/seller disputes over completed
//! marketplace orders: a finite state machine with authorization tied to
//! dispute roles, timing windows, priority derivation, append-only evidence
//! and audit trails, and read-side statistics.

pub mod event;
pub mod guard;
pub mod model;
pub mod number;
pub mod priority;
pub mod repository;
pub mod service;
pub mod stats;
pub mod status;

pub use event::{ActorType, DisputeEvent, DisputeEventType, EventMetadata};
pub use guard::DisputeRole;
pub use model::{
    Dispute, DisputeReason, Evidence, EvidenceInput, SellerResponseType, StatusChange,
};
pub use number::DisputeNumber;
pub use priority::PriorityLevel;
pub use repository::{DisputeFilter, DisputeSort, Repository};
pub use service::{
    AcceptResolution, AddEvidence, CloseDispute, CreateDispute, DisputeDetail, DisputeService,
    EscalateDispute, MarkUnderReview, RejectResolution, SellerRespond,
};
pub use stats::DisputeStats;
pub use status::DisputeStatus;
