//! Dispute lifecycle manager.
//!
//! Orchestrates guard checks, eligibility windows, numbering, priority
//! derivation, transition validation, persistence, and audit logging behind
//! one service facade. Every mutating operation commits the dispute and its
//! single audit event as one repository unit.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DisputeId, DomainError, DomainResult, OrderId, Pagination, UserId};
use tradepost_orders::{InvoiceRecord, OrderException};

use crate::event::{ActorType, DisputeEvent, DisputeEventType, EventMetadata};
use crate::guard::{self, DisputeRole};
use crate::model::{Dispute, DisputeReason, Evidence, EvidenceInput, SellerResponseType};
use crate::priority;
use crate::repository::{DisputeFilter, DisputeSort, Repository};
use crate::stats::{self, DisputeStats};
use crate::status::DisputeStatus;

/// Events returned inline with a dispute detail view.
pub const RECENT_EVENTS_LIMIT: usize = 20;

impl From<DisputeRole> for ActorType {
    fn from(role: DisputeRole) -> Self {
        match role {
            DisputeRole::Buyer => ActorType::Buyer,
            DisputeRole::Seller => ActorType::Seller,
        }
    }
}

/// Command: buyer opens a dispute against a delivered order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDispute {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub reason: DisputeReason,
    pub description: String,
    pub requested_resolution: Option<String>,
    pub requested_amount: Option<u64>,
    pub evidence: Vec<EvidenceInput>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: seller opens the case for review.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkUnderReview {
    pub dispute_id: DisputeId,
    pub seller_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: seller answers the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRespond {
    pub dispute_id: DisputeId,
    pub seller_id: UserId,
    pub response_type: SellerResponseType,
    pub response: String,
    pub proposed_resolution: Option<String>,
    pub proposed_amount: Option<u64>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: buyer accepts the seller's proposed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptResolution {
    pub dispute_id: DisputeId,
    pub buyer_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: buyer rejects the seller's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectResolution {
    pub dispute_id: DisputeId,
    pub buyer_id: UserId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: either party escalates the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalateDispute {
    pub dispute_id: DisputeId,
    pub actor_id: UserId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: either party closes the case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloseDispute {
    pub dispute_id: DisputeId,
    pub actor_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: buyer attaches further evidence. The boundary layer validates
/// that `items` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddEvidence {
    pub dispute_id: DisputeId,
    pub buyer_id: UserId,
    pub items: Vec<EvidenceInput>,
    pub occurred_at: DateTime<Utc>,
}

/// Dispute detail view: the case, its most recent audit events (newest
/// first), and the linked invoice reference when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeDetail {
    pub dispute: Dispute,
    pub events: Vec<DisputeEvent>,
    pub invoice: Option<InvoiceRecord>,
}

/// The dispute workflow engine's externally visible operations.
pub struct DisputeService<R> {
    repo: R,
}

impl<R: Repository> DisputeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn load(&self, id: DisputeId) -> DomainResult<Dispute> {
        self.repo.dispute(id)?.ok_or(DomainError::NotFound)
    }

    /// Open a new dispute. Preconditions are checked in order; the first
    /// failure wins.
    pub fn create_dispute(&self, cmd: CreateDispute) -> DomainResult<Dispute> {
        let order = self.repo.order(cmd.order_id)?.ok_or(DomainError::NotFound)?;

        if order.buyer_id != cmd.buyer_id {
            // "You can only open disputes on your own orders."
            return Err(DomainError::unauthorized());
        }
        if !order.is_disputable() {
            return Err(DomainError::validation(
                "disputes can only be opened on delivered orders",
            ));
        }
        if self.repo.active_dispute_for_order(cmd.order_id)?.is_some() {
            return Err(DomainError::validation(
                "an active dispute already exists for this order",
            ));
        }
        if let Some(delivered_at) = order.delivered_at {
            if !priority::within_dispute_window(delivered_at, cmd.occurred_at) {
                return Err(DomainError::validation("dispute window has expired"));
            }
        }

        let number = self.repo.allocate_dispute_number(cmd.occurred_at.year())?;
        let invoice_id = self
            .repo
            .invoice_for_order(cmd.order_id)?
            .map(|invoice| invoice.id);
        let evidence: Vec<Evidence> = cmd
            .evidence
            .into_iter()
            .map(|input| Evidence::from_input(input, cmd.occurred_at))
            .collect();

        let dispute = Dispute::open(
            number,
            &order,
            invoice_id,
            cmd.reason,
            cmd.description,
            cmd.requested_resolution,
            cmd.requested_amount,
            evidence,
            cmd.occurred_at,
        );

        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::DisputeCreated,
            Some(cmd.buyer_id),
            ActorType::Buyer,
            cmd.occurred_at,
        )
        .with_target_status(DisputeStatus::Open)
        .with_metadata(EventMetadata::Creation {
            reason: cmd.reason,
            priority: dispute.priority_level,
            order_total: order.total_price,
        });

        let dispute = self.repo.insert_dispute(dispute, event)?;
        self.repo
            .flag_order_exception(cmd.order_id, OrderException::DisputeFiled)?;

        tracing::info!(
            dispute = %dispute.dispute_number,
            order = %cmd.order_id,
            priority = %dispute.priority_level,
            "dispute created"
        );
        Ok(dispute)
    }

    /// Seller acknowledges the case and opens review.
    pub fn mark_under_review(&self, cmd: MarkUnderReview) -> DomainResult<Dispute> {
        let mut dispute = self.load(cmd.dispute_id)?;
        guard::require_seller(&dispute, cmd.seller_id)?;

        let change = dispute.mark_under_review(cmd.occurred_at)?;
        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::DisputeViewed,
            Some(cmd.seller_id),
            ActorType::Seller,
            cmd.occurred_at,
        )
        .with_transition(change.from, change.to);

        let dispute = self.repo.update_dispute(dispute, event)?;
        tracing::info!(dispute = %dispute.dispute_number, "dispute under review");
        Ok(dispute)
    }

    /// Seller answers: propose a resolution, accept responsibility outright,
    /// or reject the claim.
    pub fn seller_respond(&self, cmd: SellerRespond) -> DomainResult<Dispute> {
        let mut dispute = self.load(cmd.dispute_id)?;
        guard::require_seller(&dispute, cmd.seller_id)?;

        let change = dispute.seller_respond(
            cmd.response_type,
            cmd.response,
            cmd.proposed_resolution,
            cmd.proposed_amount,
            cmd.occurred_at,
        )?;
        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::SellerResponded,
            Some(cmd.seller_id),
            ActorType::Seller,
            cmd.occurred_at,
        )
        .with_transition(change.from, change.to)
        .with_metadata(EventMetadata::Response {
            response_type: cmd.response_type,
        });

        let dispute = self.repo.update_dispute(dispute, event)?;
        tracing::info!(
            dispute = %dispute.dispute_number,
            from = %change.from,
            to = %change.to,
            "seller responded"
        );
        Ok(dispute)
    }

    /// Buyer accepts the seller's proposed resolution.
    pub fn accept_resolution(&self, cmd: AcceptResolution) -> DomainResult<Dispute> {
        let mut dispute = self.load(cmd.dispute_id)?;
        guard::require_buyer(&dispute, cmd.buyer_id)?;

        let change = dispute.accept_resolution(cmd.occurred_at)?;
        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::BuyerAccepted,
            Some(cmd.buyer_id),
            ActorType::Buyer,
            cmd.occurred_at,
        )
        .with_transition(change.from, change.to);

        let dispute = self.repo.update_dispute(dispute, event)?;
        tracing::info!(dispute = %dispute.dispute_number, "buyer accepted resolution");
        Ok(dispute)
    }

    /// Buyer rejects the seller's answer. The reason is audit-only metadata.
    pub fn reject_resolution(&self, cmd: RejectResolution) -> DomainResult<Dispute> {
        let mut dispute = self.load(cmd.dispute_id)?;
        guard::require_buyer(&dispute, cmd.buyer_id)?;

        let change = dispute.reject_resolution(cmd.occurred_at)?;
        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::BuyerRejected,
            Some(cmd.buyer_id),
            ActorType::Buyer,
            cmd.occurred_at,
        )
        .with_transition(change.from, change.to)
        .with_metadata(EventMetadata::Rejection { reason: cmd.reason });

        let dispute = self.repo.update_dispute(dispute, event)?;
        tracing::info!(dispute = %dispute.dispute_number, "buyer rejected resolution");
        Ok(dispute)
    }

    /// Either party escalates. Forces priority to urgent.
    pub fn escalate_dispute(&self, cmd: EscalateDispute) -> DomainResult<Dispute> {
        let mut dispute = self.load(cmd.dispute_id)?;
        let role = guard::require_party(&dispute, cmd.actor_id)?;

        let change = dispute.escalate(cmd.reason.clone(), cmd.occurred_at)?;
        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::Escalated,
            Some(cmd.actor_id),
            role.into(),
            cmd.occurred_at,
        )
        .with_transition(change.from, change.to)
        .with_metadata(EventMetadata::Escalation { reason: cmd.reason });

        let dispute = self.repo.update_dispute(dispute, event)?;
        tracing::warn!(
            dispute = %dispute.dispute_number,
            from = %change.from,
            "dispute escalated"
        );
        Ok(dispute)
    }

    /// Either party closes. Fails on an already-closed dispute.
    pub fn close_dispute(&self, cmd: CloseDispute) -> DomainResult<Dispute> {
        let mut dispute = self.load(cmd.dispute_id)?;
        let role = guard::require_party(&dispute, cmd.actor_id)?;

        let change = dispute.close(cmd.occurred_at)?;
        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::Closed,
            Some(cmd.actor_id),
            role.into(),
            cmd.occurred_at,
        )
        .with_transition(change.from, change.to);

        let dispute = self.repo.update_dispute(dispute, event)?;
        tracing::info!(dispute = %dispute.dispute_number, from = %change.from, "dispute closed");
        Ok(dispute)
    }

    /// Buyer attaches further evidence (sellers cannot). Appended atomically;
    /// earlier items are never altered.
    pub fn add_evidence(&self, cmd: AddEvidence) -> DomainResult<Dispute> {
        let dispute = self.load(cmd.dispute_id)?;
        guard::require_buyer(&dispute, cmd.buyer_id)?;
        dispute.ensure_accepts_evidence()?;

        let items: Vec<Evidence> = cmd
            .items
            .into_iter()
            .map(|input| Evidence::from_input(input, cmd.occurred_at))
            .collect();
        let event = DisputeEvent::new(
            dispute.id,
            DisputeEventType::EvidenceAdded,
            Some(cmd.buyer_id),
            ActorType::Buyer,
            cmd.occurred_at,
        )
        .with_metadata(EventMetadata::EvidenceAppended { count: items.len() });

        let dispute = self.repo.append_evidence(cmd.dispute_id, items, event)?;
        tracing::info!(
            dispute = %dispute.dispute_number,
            total_items = dispute.evidence.len(),
            "evidence added"
        );
        Ok(dispute)
    }

    /// Detail view for a party: dispute, recent events, linked invoice.
    /// Non-parties get `NotFound`.
    pub fn get_dispute(&self, dispute_id: DisputeId, user_id: UserId) -> DomainResult<DisputeDetail> {
        let dispute = self.load(dispute_id)?;
        guard::require_party_for_read(&dispute, user_id)?;

        let events = self
            .repo
            .events_for_dispute(dispute_id, Some(RECENT_EVENTS_LIMIT))?;
        let invoice = match dispute.invoice_id {
            Some(_) => self.repo.invoice_for_order(dispute.order_id)?,
            None => None,
        };
        Ok(DisputeDetail {
            dispute,
            events,
            invoice,
        })
    }

    /// Full audit history, newest first. Non-parties get `NotFound`.
    pub fn get_dispute_history(
        &self,
        dispute_id: DisputeId,
        user_id: UserId,
    ) -> DomainResult<Vec<DisputeEvent>> {
        let dispute = self.load(dispute_id)?;
        guard::require_party_for_read(&dispute, user_id)?;
        self.repo.events_for_dispute(dispute_id, None)
    }

    /// The latest dispute filed against an order. Non-parties get `NotFound`.
    pub fn get_dispute_by_order(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> DomainResult<Dispute> {
        let dispute = self
            .repo
            .dispute_for_order(order_id)?
            .ok_or(DomainError::NotFound)?;
        guard::require_party_for_read(&dispute, user_id)?;
        Ok(dispute)
    }

    /// Buyer's case list, newest first.
    pub fn list_buyer_disputes(
        &self,
        buyer_id: UserId,
        status: Option<DisputeStatus>,
        page: Pagination,
    ) -> DomainResult<Vec<Dispute>> {
        let filter = DisputeFilter {
            status,
            ..DisputeFilter::for_buyer(buyer_id)
        };
        self.repo
            .list_disputes(&filter, DisputeSort::CreatedDesc, page)
    }

    /// Seller's work queue: urgent and overdue cases first.
    pub fn list_seller_disputes(
        &self,
        seller_id: UserId,
        status: Option<DisputeStatus>,
        page: Pagination,
    ) -> DomainResult<Vec<Dispute>> {
        let filter = DisputeFilter {
            status,
            ..DisputeFilter::for_seller(seller_id)
        };
        self.repo
            .list_disputes(&filter, DisputeSort::SellerQueue, page)
    }

    /// Rollup over the buyer's full case load.
    pub fn buyer_dispute_stats(&self, buyer_id: UserId) -> DomainResult<DisputeStats> {
        let disputes = self.repo.disputes(&DisputeFilter::for_buyer(buyer_id))?;
        Ok(stats::aggregate(&disputes))
    }

    /// Rollup over the seller's full case load.
    pub fn seller_dispute_stats(&self, seller_id: UserId) -> DomainResult<DisputeStats> {
        let disputes = self.repo.disputes(&DisputeFilter::for_seller(seller_id))?;
        Ok(stats::aggregate(&disputes))
    }
}
