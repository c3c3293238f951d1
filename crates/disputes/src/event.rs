//! Append-only audit trail of every state-affecting dispute action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DisputeId, EventId, UserId};

use crate::model::{DisputeReason, SellerResponseType};
use crate::priority::PriorityLevel;
use crate::status::DisputeStatus;

/// Who performed the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    Buyer,
    Seller,
    System,
    Platform,
}

/// Audit event tag. Serialized with the legacy SCREAMING_SNAKE wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeEventType {
    DisputeCreated,
    DisputeViewed,
    SellerResponded,
    BuyerAccepted,
    BuyerRejected,
    Escalated,
    Closed,
    EvidenceAdded,
}

impl DisputeEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeEventType::DisputeCreated => "DISPUTE_CREATED",
            DisputeEventType::DisputeViewed => "DISPUTE_VIEWED",
            DisputeEventType::SellerResponded => "SELLER_RESPONDED",
            DisputeEventType::BuyerAccepted => "BUYER_ACCEPTED",
            DisputeEventType::BuyerRejected => "BUYER_REJECTED",
            DisputeEventType::Escalated => "ESCALATED",
            DisputeEventType::Closed => "CLOSED",
            DisputeEventType::EvidenceAdded => "EVIDENCE_ADDED",
        }
    }
}

impl core::fmt::Display for DisputeEventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured, operation-specific event payload.
///
/// One variant per event family instead of an opaque JSON blob, so consumers
/// parse nothing and the schema is compiler-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventMetadata {
    Creation {
        reason: DisputeReason,
        priority: PriorityLevel,
        order_total: u64,
    },
    Response {
        response_type: SellerResponseType,
    },
    Rejection {
        reason: String,
    },
    Escalation {
        reason: String,
    },
    EvidenceAppended {
        count: usize,
    },
}

/// One audit record. Append-only: never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeEvent {
    pub id: EventId,
    pub dispute_id: DisputeId,
    pub event_type: DisputeEventType,
    pub actor_id: Option<UserId>,
    pub actor_type: ActorType,
    pub from_status: Option<DisputeStatus>,
    pub to_status: Option<DisputeStatus>,
    pub metadata: Option<EventMetadata>,
    pub created_at: DateTime<Utc>,
}

impl DisputeEvent {
    pub fn new(
        dispute_id: DisputeId,
        event_type: DisputeEventType,
        actor_id: Option<UserId>,
        actor_type: ActorType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            dispute_id,
            event_type,
            actor_id,
            actor_type,
            from_status: None,
            to_status: None,
            metadata: None,
            created_at,
        }
    }

    /// Record the status change this event witnesses.
    pub fn with_transition(mut self, from: DisputeStatus, to: DisputeStatus) -> Self {
        self.from_status = Some(from);
        self.to_status = Some(to);
        self
    }

    /// Record a creation target status (no prior status exists).
    pub fn with_target_status(mut self, to: DisputeStatus) -> Self {
        self.to_status = Some(to);
        self
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn event_type_uses_legacy_wire_tags() {
        let json = serde_json::to_string(&DisputeEventType::DisputeCreated).unwrap();
        assert_eq!(json, "\"DISPUTE_CREATED\"");
        assert_eq!(DisputeEventType::EvidenceAdded.as_str(), "EVIDENCE_ADDED");
        let back: DisputeEventType = serde_json::from_str("\"SELLER_RESPONDED\"").unwrap();
        assert_eq!(back, DisputeEventType::SellerResponded);
    }

    #[test]
    fn metadata_is_tagged_by_kind() {
        let meta = EventMetadata::Rejection {
            reason: "refund too small".to_string(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["kind"], "rejection");
        assert_eq!(json["reason"], "refund too small");
    }

    #[test]
    fn builder_carries_transition_and_metadata() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let dispute_id = DisputeId::new();
        let actor = UserId::new();
        let event = DisputeEvent::new(
            dispute_id,
            DisputeEventType::Escalated,
            Some(actor),
            ActorType::Buyer,
            now,
        )
        .with_transition(DisputeStatus::Rejected, DisputeStatus::Escalated)
        .with_metadata(EventMetadata::Escalation {
            reason: "stalled".to_string(),
        });

        assert_eq!(event.dispute_id, dispute_id);
        assert_eq!(event.from_status, Some(DisputeStatus::Rejected));
        assert_eq!(event.to_status, Some(DisputeStatus::Escalated));
        assert_eq!(event.actor_id, Some(actor));
        assert!(event.metadata.is_some());
    }
}
