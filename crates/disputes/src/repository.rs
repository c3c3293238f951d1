//! Persistence contract consumed by the lifecycle service.
//!
//! Mutating operations are transactional units: a dispute write and its
//! single audit event commit together, so a failed operation leaves neither a
//! dangling event nor a half-applied transition. The numbering allocator and
//! the active-dispute check are atomic inside the implementation rather than
//! read-then-write sequences in the caller.

use serde::{Deserialize, Serialize};

use tradepost_core::{DisputeId, DomainResult, OrderId, Pagination, UserId};
use tradepost_orders::{InvoiceRecord, OrderException, OrderRecord};

use crate::event::DisputeEvent;
use crate::model::{Dispute, Evidence};
use crate::number::DisputeNumber;
use crate::status::DisputeStatus;

/// Filter criteria for dispute listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DisputeFilter {
    pub buyer_id: Option<UserId>,
    pub seller_id: Option<UserId>,
    pub order_id: Option<OrderId>,
    pub status: Option<DisputeStatus>,
}

impl DisputeFilter {
    pub fn for_buyer(buyer_id: UserId) -> Self {
        Self {
            buyer_id: Some(buyer_id),
            ..Self::default()
        }
    }

    pub fn for_seller(seller_id: UserId) -> Self {
        Self {
            seller_id: Some(seller_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, dispute: &Dispute) -> bool {
        self.buyer_id.is_none_or(|id| dispute.buyer_id == id)
            && self.seller_id.is_none_or(|id| dispute.seller_id == id)
            && self.order_id.is_none_or(|id| dispute.order_id == id)
            && self.status.is_none_or(|s| dispute.status == s)
    }
}

/// Sort orders for dispute listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeSort {
    /// Newest first (buyer listings).
    CreatedDesc,
    /// Urgent and overdue cases first: priority desc, response deadline asc,
    /// created desc (seller work queues).
    SellerQueue,
}

/// Apply a listing sort in place. Shared by repository implementations.
pub fn sort_disputes(disputes: &mut [Dispute], sort: DisputeSort) {
    match sort {
        DisputeSort::CreatedDesc => {
            disputes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        DisputeSort::SellerQueue => {
            disputes.sort_by(|a, b| {
                b.priority_level
                    .cmp(&a.priority_level)
                    .then(a.response_deadline.cmp(&b.response_deadline))
                    .then(b.created_at.cmp(&a.created_at))
            });
        }
    }
}

/// Persistence contract for the dispute workflow engine.
pub trait Repository: Send + Sync {
    // Order side.
    fn order(&self, id: OrderId) -> DomainResult<Option<OrderRecord>>;
    fn invoice_for_order(&self, order_id: OrderId) -> DomainResult<Option<InvoiceRecord>>;
    /// Flag the order as carrying an exception (side effect of filing).
    fn flag_order_exception(&self, order_id: OrderId, exception: OrderException)
    -> DomainResult<()>;

    // Dispute side.
    /// Atomically allocate the next dispute number within `year`. Serialized:
    /// concurrent creations receive a contiguous, duplicate-free sequence.
    fn allocate_dispute_number(&self, year: i32) -> DomainResult<DisputeNumber>;

    /// Insert a new dispute and its creation event in one unit. Re-checks the
    /// at-most-one-active-dispute-per-order invariant under the same lock or
    /// transaction that performs the insert.
    fn insert_dispute(&self, dispute: Dispute, event: DisputeEvent) -> DomainResult<Dispute>;

    /// Persist a mutated dispute and exactly one audit event in one unit.
    fn update_dispute(&self, dispute: Dispute, event: DisputeEvent) -> DomainResult<Dispute>;

    /// Atomically append evidence items to the stored dispute (no
    /// load-modify-store race) along with the audit event.
    fn append_evidence(
        &self,
        dispute_id: DisputeId,
        items: Vec<Evidence>,
        event: DisputeEvent,
    ) -> DomainResult<Dispute>;

    fn dispute(&self, id: DisputeId) -> DomainResult<Option<Dispute>>;
    /// Latest dispute filed against the order, in any status.
    fn dispute_for_order(&self, order_id: OrderId) -> DomainResult<Option<Dispute>>;
    /// The non-terminal, non-rejected dispute for the order, if one exists.
    fn active_dispute_for_order(&self, order_id: OrderId) -> DomainResult<Option<Dispute>>;

    /// All disputes matching `filter`, unsorted (stats aggregation).
    fn disputes(&self, filter: &DisputeFilter) -> DomainResult<Vec<Dispute>>;

    /// Filtered, sorted, paginated listing.
    fn list_disputes(
        &self,
        filter: &DisputeFilter,
        sort: DisputeSort,
        page: Pagination,
    ) -> DomainResult<Vec<Dispute>>;

    /// Audit events for a dispute, newest first, optionally limited.
    fn events_for_dispute(
        &self,
        dispute_id: DisputeId,
        limit: Option<usize>,
    ) -> DomainResult<Vec<DisputeEvent>>;
}

impl<R: Repository + ?Sized> Repository for std::sync::Arc<R> {
    fn order(&self, id: OrderId) -> DomainResult<Option<OrderRecord>> {
        (**self).order(id)
    }

    fn invoice_for_order(&self, order_id: OrderId) -> DomainResult<Option<InvoiceRecord>> {
        (**self).invoice_for_order(order_id)
    }

    fn flag_order_exception(
        &self,
        order_id: OrderId,
        exception: OrderException,
    ) -> DomainResult<()> {
        (**self).flag_order_exception(order_id, exception)
    }

    fn allocate_dispute_number(&self, year: i32) -> DomainResult<DisputeNumber> {
        (**self).allocate_dispute_number(year)
    }

    fn insert_dispute(&self, dispute: Dispute, event: DisputeEvent) -> DomainResult<Dispute> {
        (**self).insert_dispute(dispute, event)
    }

    fn update_dispute(&self, dispute: Dispute, event: DisputeEvent) -> DomainResult<Dispute> {
        (**self).update_dispute(dispute, event)
    }

    fn append_evidence(
        &self,
        dispute_id: DisputeId,
        items: Vec<Evidence>,
        event: DisputeEvent,
    ) -> DomainResult<Dispute> {
        (**self).append_evidence(dispute_id, items, event)
    }

    fn dispute(&self, id: DisputeId) -> DomainResult<Option<Dispute>> {
        (**self).dispute(id)
    }

    fn dispute_for_order(&self, order_id: OrderId) -> DomainResult<Option<Dispute>> {
        (**self).dispute_for_order(order_id)
    }

    fn active_dispute_for_order(&self, order_id: OrderId) -> DomainResult<Option<Dispute>> {
        (**self).active_dispute_for_order(order_id)
    }

    fn disputes(&self, filter: &DisputeFilter) -> DomainResult<Vec<Dispute>> {
        (**self).disputes(filter)
    }

    fn list_disputes(
        &self,
        filter: &DisputeFilter,
        sort: DisputeSort,
        page: Pagination,
    ) -> DomainResult<Vec<Dispute>> {
        (**self).list_disputes(filter, sort, page)
    }

    fn events_for_dispute(
        &self,
        dispute_id: DisputeId,
        limit: Option<usize>,
    ) -> DomainResult<Vec<DisputeEvent>> {
        (**self).events_for_dispute(dispute_id, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tradepost_orders::OrderStatus;

    use crate::model::DisputeReason;
    use crate::number::DisputeNumber;
    use crate::priority::PriorityLevel;

    fn dispute_at(minutes: i64, total_price: u64) -> Dispute {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        let order = OrderRecord {
            id: OrderId::new(),
            buyer_id: UserId::new(),
            seller_id: UserId::new(),
            buyer_name: "Ada".to_string(),
            seller_name: "Keycap Works".to_string(),
            item_name: "Deskmat".to_string(),
            quantity: 1,
            unit_price: total_price,
            total_price,
            status: OrderStatus::Delivered,
            delivered_at: Some(now),
            has_exception: false,
            exception_type: None,
        };
        Dispute::open(
            DisputeNumber::first(2026),
            &order,
            None,
            DisputeReason::Other,
            "test".to_string(),
            None,
            None,
            Vec::new(),
            now,
        )
    }

    #[test]
    fn filter_matches_on_every_dimension() {
        let dispute = dispute_at(0, 100);
        assert!(DisputeFilter::default().matches(&dispute));
        assert!(DisputeFilter::for_buyer(dispute.buyer_id).matches(&dispute));
        assert!(!DisputeFilter::for_buyer(UserId::new()).matches(&dispute));
        assert!(DisputeFilter::for_seller(dispute.seller_id).matches(&dispute));

        let by_status = DisputeFilter {
            status: Some(DisputeStatus::Closed),
            ..Default::default()
        };
        assert!(!by_status.matches(&dispute));
    }

    #[test]
    fn created_desc_puts_newest_first() {
        let mut disputes = vec![dispute_at(0, 100), dispute_at(20, 100), dispute_at(10, 100)];
        sort_disputes(&mut disputes, DisputeSort::CreatedDesc);
        let stamps: Vec<_> = disputes.iter().map(|d| d.created_at).collect();
        assert!(stamps[0] > stamps[1] && stamps[1] > stamps[2]);
    }

    #[test]
    fn seller_queue_surfaces_urgent_then_overdue() {
        // 12_000 -> urgent, 6_000 -> high, 100 -> medium.
        let urgent = dispute_at(30, 12_000);
        let high_older = dispute_at(0, 6_000);
        let high_newer = dispute_at(10, 6_000);
        let medium = dispute_at(5, 100);

        let mut disputes = vec![
            medium.clone(),
            high_newer.clone(),
            urgent.clone(),
            high_older.clone(),
        ];
        sort_disputes(&mut disputes, DisputeSort::SellerQueue);

        assert_eq!(disputes[0].priority_level, PriorityLevel::Urgent);
        // Same priority: earlier response deadline first.
        assert_eq!(disputes[1].id, high_older.id);
        assert_eq!(disputes[2].id, high_newer.id);
        assert_eq!(disputes[3].id, medium.id);
    }
}
