//! In-memory repository.
//!
//! Intended for tests/dev. A single `RwLock` guards all state, and every
//! mutating operation holds the write lock for its whole unit, which gives
//! the engine the atomicity it relies on: serialized dispute numbering, the
//! active-dispute uniqueness check performed under the same lock as the
//! insert, evidence appended in place, and dispute + audit event committed
//! together.

use std::collections::HashMap;
use std::sync::RwLock;

use tradepost_core::{DisputeId, DomainError, DomainResult, OrderId, Pagination};
use tradepost_disputes::repository::{DisputeFilter, DisputeSort, Repository, sort_disputes};
use tradepost_disputes::{Dispute, DisputeEvent, DisputeNumber, Evidence};
use tradepost_orders::{InvoiceRecord, OrderException, OrderRecord};

#[derive(Debug, Default)]
struct State {
    orders: HashMap<OrderId, OrderRecord>,
    invoices: HashMap<OrderId, InvoiceRecord>,
    disputes: HashMap<DisputeId, Dispute>,
    /// Append-only audit streams, oldest first.
    events: HashMap<DisputeId, Vec<DisputeEvent>>,
    /// Last allocated dispute sequence per year.
    sequences: HashMap<i32, u32>,
}

/// In-memory `Repository` implementation.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::internal("lock poisoned")
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an order (test fixture).
    pub fn insert_order(&self, order: OrderRecord) -> DomainResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.orders.insert(order.id, order);
        Ok(())
    }

    /// Seed an invoice (test fixture).
    pub fn insert_invoice(&self, invoice: InvoiceRecord) -> DomainResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.invoices.insert(invoice.order_id, invoice);
        Ok(())
    }

    /// Total number of stored audit events (test assertions).
    pub fn event_count(&self) -> DomainResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.events.values().map(Vec::len).sum())
    }
}

impl Repository for InMemoryRepository {
    fn order(&self, id: OrderId) -> DomainResult<Option<OrderRecord>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.orders.get(&id).cloned())
    }

    fn invoice_for_order(&self, order_id: OrderId) -> DomainResult<Option<InvoiceRecord>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.invoices.get(&order_id).cloned())
    }

    fn flag_order_exception(
        &self,
        order_id: OrderId,
        exception: OrderException,
    ) -> DomainResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let order = state.orders.get_mut(&order_id).ok_or(DomainError::NotFound)?;
        order.has_exception = true;
        order.exception_type = Some(exception);
        Ok(())
    }

    fn allocate_dispute_number(&self, year: i32) -> DomainResult<DisputeNumber> {
        let mut state = self.state.write().map_err(poisoned)?;
        // Seed the counter from pre-existing records the first time a year is
        // seen, so allocation continues an existing sequence.
        if !state.sequences.contains_key(&year) {
            let max_existing = state
                .disputes
                .values()
                .map(|d| &d.dispute_number)
                .filter(|n| n.year() == year)
                .map(|n| n.sequence())
                .max()
                .unwrap_or(0);
            state.sequences.insert(year, max_existing);
        }
        let counter = state
            .sequences
            .get_mut(&year)
            .ok_or_else(|| DomainError::internal("sequence counter missing"))?;
        *counter += 1;
        Ok(DisputeNumber::new(year, *counter))
    }

    fn insert_dispute(&self, dispute: Dispute, event: DisputeEvent) -> DomainResult<Dispute> {
        let mut state = self.state.write().map_err(poisoned)?;
        // The uniqueness invariant is re-checked under the same lock that
        // performs the insert, closing the check-then-act race.
        let conflicting = state
            .disputes
            .values()
            .any(|d| d.order_id == dispute.order_id && d.status.is_active());
        if conflicting {
            return Err(DomainError::validation(
                "an active dispute already exists for this order",
            ));
        }

        state.events.entry(dispute.id).or_default().push(event);
        state.disputes.insert(dispute.id, dispute.clone());
        Ok(dispute)
    }

    fn update_dispute(&self, dispute: Dispute, event: DisputeEvent) -> DomainResult<Dispute> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.disputes.contains_key(&dispute.id) {
            return Err(DomainError::NotFound);
        }
        state.events.entry(dispute.id).or_default().push(event);
        state.disputes.insert(dispute.id, dispute.clone());
        Ok(dispute)
    }

    fn append_evidence(
        &self,
        dispute_id: DisputeId,
        items: Vec<Evidence>,
        event: DisputeEvent,
    ) -> DomainResult<Dispute> {
        let mut state = self.state.write().map_err(poisoned)?;
        let dispute = state
            .disputes
            .get_mut(&dispute_id)
            .ok_or(DomainError::NotFound)?;
        // Appended to the stored record in place: concurrent appends cannot
        // lose an update.
        dispute.evidence.extend(items);
        dispute.updated_at = event.created_at;
        let updated = dispute.clone();
        state.events.entry(dispute_id).or_default().push(event);
        Ok(updated)
    }

    fn dispute(&self, id: DisputeId) -> DomainResult<Option<Dispute>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.disputes.get(&id).cloned())
    }

    fn dispute_for_order(&self, order_id: OrderId) -> DomainResult<Option<Dispute>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .disputes
            .values()
            .filter(|d| d.order_id == order_id)
            .max_by_key(|d| d.created_at)
            .cloned())
    }

    fn active_dispute_for_order(&self, order_id: OrderId) -> DomainResult<Option<Dispute>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .disputes
            .values()
            .find(|d| d.order_id == order_id && d.status.is_active())
            .cloned())
    }

    fn disputes(&self, filter: &DisputeFilter) -> DomainResult<Vec<Dispute>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .disputes
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    fn list_disputes(
        &self,
        filter: &DisputeFilter,
        sort: DisputeSort,
        page: Pagination,
    ) -> DomainResult<Vec<Dispute>> {
        let mut matching = self.disputes(filter)?;
        sort_disputes(&mut matching, sort);
        Ok(page.slice(&matching))
    }

    fn events_for_dispute(
        &self,
        dispute_id: DisputeId,
        limit: Option<usize>,
    ) -> DomainResult<Vec<DisputeEvent>> {
        let state = self.state.read().map_err(poisoned)?;
        let stream = state.events.get(&dispute_id).cloned().unwrap_or_default();
        // Stored oldest first; served newest first.
        let mut newest_first: Vec<DisputeEvent> = stream.into_iter().rev().collect();
        if let Some(limit) = limit {
            newest_first.truncate(limit);
        }
        Ok(newest_first)
    }
}
