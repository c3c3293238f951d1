//! The dispute aggregate and its pure decision logic.
//!
//! Mutation methods validate preconditions and transitions, then evolve the
//! in-memory value. They perform no IO; the lifecycle service persists the
//! result together with exactly one audit event per status change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DisputeId, DomainError, DomainResult, EvidenceId, InvoiceId, OrderId, UserId};
use tradepost_orders::OrderRecord;

use crate::number::DisputeNumber;
use crate::priority::{self, PriorityLevel};
use crate::status::{DisputeStatus, ensure_transition};

/// Why the buyer opened the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeReason {
    WrongItem,
    DamagedGoods,
    MissingQuantity,
    LateDelivery,
    QualityIssue,
    Other,
}

/// How the seller answered the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerResponseType {
    ProposeResolution,
    AcceptResponsibility,
    Reject,
}

/// Resolution provenance tags.
pub const RESOLVED_BY_SELLER: &str = "seller_accepted";
pub const RESOLVED_BY_BUYER: &str = "buyer_accepted";

/// Fallback resolution when a seller accepts responsibility without naming one.
pub const DEFAULT_RESOLUTION: &str = "full_refund";

/// A buyer-supplied supporting file or link. Append-only: never edited,
/// reordered, or removed once attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    pub name: String,
    pub kind: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Evidence fields as submitted at the boundary (id and timestamp are
/// assigned here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceInput {
    pub name: String,
    pub kind: String,
    pub url: String,
}

impl Evidence {
    pub fn from_input(input: EvidenceInput, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: EvidenceId::new(),
            name: input.name,
            kind: input.kind,
            url: input.url,
            uploaded_at,
        }
    }
}

/// A status change applied to a dispute, for audit pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: DisputeStatus,
    pub to: DisputeStatus,
}

/// Aggregate root: a buyer/seller dispute over a delivered order.
///
/// Linkage and snapshot fields are immutable after creation; the snapshot
/// keeps the case stable even if the order record later changes. The whole
/// record becomes immutable once `status` is `Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub dispute_number: DisputeNumber,

    // Linkage (immutable after creation).
    pub order_id: OrderId,
    pub invoice_id: Option<InvoiceId>,
    pub buyer_id: UserId,
    pub seller_id: UserId,

    // Order snapshot (immutable after creation).
    pub buyer_name: String,
    pub seller_name: String,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub total_price: u64,

    // Case content.
    pub reason: DisputeReason,
    pub description: String,
    pub requested_resolution: Option<String>,
    pub requested_amount: Option<u64>,
    pub evidence: Vec<Evidence>,

    // Workflow state.
    pub status: DisputeStatus,
    pub priority_level: PriorityLevel,
    pub response_deadline: DateTime<Utc>,
    pub resolution_deadline: DateTime<Utc>,
    pub is_escalated: bool,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,

    // Seller response.
    pub seller_response_type: Option<SellerResponseType>,
    pub seller_response: Option<String>,
    pub seller_proposed_resolution: Option<String>,
    pub seller_proposed_amount: Option<u64>,
    pub responded_at: Option<DateTime<Utc>>,

    // Resolution.
    pub resolution: Option<String>,
    pub resolution_amount: Option<u64>,
    pub resolved_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    /// Open a new dispute against `order`, snapshotting the fields the case
    /// needs and deriving priority and deadlines from the creation instant.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        number: DisputeNumber,
        order: &OrderRecord,
        invoice_id: Option<InvoiceId>,
        reason: DisputeReason,
        description: String,
        requested_resolution: Option<String>,
        requested_amount: Option<u64>,
        evidence: Vec<Evidence>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DisputeId::new(),
            dispute_number: number,
            order_id: order.id,
            invoice_id,
            buyer_id: order.buyer_id,
            seller_id: order.seller_id,
            buyer_name: order.buyer_name.clone(),
            seller_name: order.seller_name.clone(),
            item_name: order.item_name.clone(),
            quantity: order.quantity,
            unit_price: order.unit_price,
            total_price: order.total_price,
            reason,
            description,
            requested_resolution,
            requested_amount,
            evidence,
            status: DisputeStatus::Open,
            priority_level: priority::calculate_priority(order.total_price, reason),
            response_deadline: priority::response_deadline(now),
            resolution_deadline: priority::resolution_deadline(now),
            is_escalated: false,
            escalated_at: None,
            escalation_reason: None,
            closed_at: None,
            seller_response_type: None,
            seller_response: None,
            seller_proposed_resolution: None,
            seller_proposed_amount: None,
            responded_at: None,
            resolution: None,
            resolution_amount: None,
            resolved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition_to(&mut self, to: DisputeStatus, now: DateTime<Utc>) -> DomainResult<StatusChange> {
        ensure_transition(self.status, to)?;
        let change = StatusChange {
            from: self.status,
            to,
        };
        self.status = to;
        self.updated_at = now;
        Ok(change)
    }

    /// Seller opens the case for review.
    pub fn mark_under_review(&mut self, now: DateTime<Utc>) -> DomainResult<StatusChange> {
        self.transition_to(DisputeStatus::UnderReview, now)
    }

    /// Record the seller's answer.
    ///
    /// Responding is allowed while `open` or `under_review`; a seller may
    /// answer before formally opening the review step, so this path uses its
    /// own precondition instead of the transition table.
    pub fn seller_respond(
        &mut self,
        response_type: SellerResponseType,
        response: String,
        proposed_resolution: Option<String>,
        proposed_amount: Option<u64>,
        now: DateTime<Utc>,
    ) -> DomainResult<StatusChange> {
        if !matches!(
            self.status,
            DisputeStatus::Open | DisputeStatus::UnderReview
        ) {
            return Err(DomainError::validation(
                "dispute is not awaiting a seller response",
            ));
        }

        let from = self.status;
        self.seller_response_type = Some(response_type);
        self.seller_response = Some(response);
        self.responded_at = Some(now);
        self.updated_at = now;

        let to = match response_type {
            SellerResponseType::ProposeResolution => {
                self.seller_proposed_resolution = proposed_resolution;
                self.seller_proposed_amount = proposed_amount;
                DisputeStatus::SellerResponded
            }
            SellerResponseType::AcceptResponsibility => {
                // Full concession short-circuits the proposal round-trip.
                self.resolution =
                    Some(proposed_resolution.unwrap_or_else(|| DEFAULT_RESOLUTION.to_string()));
                self.resolution_amount = proposed_amount;
                self.resolved_by = Some(RESOLVED_BY_SELLER.to_string());
                self.closed_at = Some(now);
                DisputeStatus::Resolved
            }
            SellerResponseType::Reject => DisputeStatus::SellerResponded,
        };
        self.status = to;
        Ok(StatusChange { from, to })
    }

    /// Buyer accepts the seller's proposed resolution.
    pub fn accept_resolution(&mut self, now: DateTime<Utc>) -> DomainResult<StatusChange> {
        if self.status != DisputeStatus::SellerResponded
            || self.seller_response_type != Some(SellerResponseType::ProposeResolution)
        {
            return Err(DomainError::validation(
                "seller has not proposed a resolution to accept",
            ));
        }
        let change = self.transition_to(DisputeStatus::Resolved, now)?;
        self.resolution = self.seller_proposed_resolution.clone();
        self.resolution_amount = self.seller_proposed_amount;
        self.resolved_by = Some(RESOLVED_BY_BUYER.to_string());
        self.closed_at = Some(now);
        Ok(change)
    }

    /// Buyer rejects the seller's answer. The rejection reason lives only in
    /// the audit event metadata.
    pub fn reject_resolution(&mut self, now: DateTime<Utc>) -> DomainResult<StatusChange> {
        if self.status != DisputeStatus::SellerResponded {
            return Err(DomainError::validation("no pending resolution to reject"));
        }
        self.transition_to(DisputeStatus::Rejected, now)
    }

    /// Escalate the case. Forces priority to urgent regardless of the
    /// value-derived level.
    pub fn escalate(&mut self, reason: String, now: DateTime<Utc>) -> DomainResult<StatusChange> {
        let change = self.transition_to(DisputeStatus::Escalated, now)?;
        self.is_escalated = true;
        self.escalated_at = Some(now);
        self.escalation_reason = Some(reason);
        self.priority_level = PriorityLevel::Urgent;
        Ok(change)
    }

    /// Close the case. Rejected on an already-closed dispute (the table has
    /// no `closed -> closed` entry), not a silent no-op.
    pub fn close(&mut self, now: DateTime<Utc>) -> DomainResult<StatusChange> {
        let change = self.transition_to(DisputeStatus::Closed, now)?;
        self.closed_at = Some(now);
        Ok(change)
    }

    /// Whether evidence may still be attached.
    pub fn ensure_accepts_evidence(&self) -> DomainResult<()> {
        if self.status.accepts_evidence() {
            Ok(())
        } else {
            Err(DomainError::validation(
                "cannot add evidence to a resolved or closed dispute",
            ))
        }
    }
}
