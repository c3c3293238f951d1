//! Authorization guard: actor identity checked against the dispute's parties.
//!
//! Pure policy checks; no IO, no panics.

use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, UserId};

use crate::model::Dispute;

/// The role a user holds on a specific dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeRole {
    Buyer,
    Seller,
}

/// The role `user` holds on `dispute`, if any.
pub fn party_role(dispute: &Dispute, user: UserId) -> Option<DisputeRole> {
    if dispute.buyer_id == user {
        Some(DisputeRole::Buyer)
    } else if dispute.seller_id == user {
        Some(DisputeRole::Seller)
    } else {
        None
    }
}

/// Mutation guard: caller must be the dispute's buyer.
pub fn require_buyer(dispute: &Dispute, user: UserId) -> DomainResult<()> {
    if dispute.buyer_id == user {
        Ok(())
    } else {
        Err(DomainError::unauthorized())
    }
}

/// Mutation guard: caller must be the dispute's seller.
pub fn require_seller(dispute: &Dispute, user: UserId) -> DomainResult<()> {
    if dispute.seller_id == user {
        Ok(())
    } else {
        Err(DomainError::unauthorized())
    }
}

/// Mutation guard: caller must be one of the dispute's parties.
pub fn require_party(dispute: &Dispute, user: UserId) -> DomainResult<DisputeRole> {
    party_role(dispute, user).ok_or_else(DomainError::unauthorized)
}

/// Read guard: a non-party sees `NotFound`, identical to a missing record,
/// so reads never leak whether a dispute exists.
pub fn require_party_for_read(dispute: &Dispute, user: UserId) -> DomainResult<DisputeRole> {
    party_role(dispute, user).ok_or_else(DomainError::not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tradepost_core::OrderId;
    use tradepost_orders::{OrderRecord, OrderStatus};

    use crate::model::DisputeReason;
    use crate::number::DisputeNumber;

    fn dispute_between(buyer: UserId, seller: UserId) -> Dispute {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let order = OrderRecord {
            id: OrderId::new(),
            buyer_id: buyer,
            seller_id: seller,
            buyer_name: "Ada".to_string(),
            seller_name: "Keycap Works".to_string(),
            item_name: "Switch tester".to_string(),
            quantity: 1,
            unit_price: 30,
            total_price: 30,
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
            "wrong color".to_string(),
            None,
            None,
            Vec::new(),
            now,
        )
    }

    #[test]
    fn roles_are_resolved_from_dispute_parties() {
        let buyer = UserId::new();
        let seller = UserId::new();
        let stranger = UserId::new();
        let dispute = dispute_between(buyer, seller);

        assert_eq!(party_role(&dispute, buyer), Some(DisputeRole::Buyer));
        assert_eq!(party_role(&dispute, seller), Some(DisputeRole::Seller));
        assert_eq!(party_role(&dispute, stranger), None);
    }

    #[test]
    fn mutation_guards_return_unauthorized() {
        let buyer = UserId::new();
        let seller = UserId::new();
        let dispute = dispute_between(buyer, seller);

        assert!(require_buyer(&dispute, buyer).is_ok());
        assert_eq!(
            require_buyer(&dispute, seller).unwrap_err(),
            DomainError::Unauthorized
        );
        assert!(require_seller(&dispute, seller).is_ok());
        assert_eq!(
            require_party(&dispute, UserId::new()).unwrap_err(),
            DomainError::Unauthorized
        );
    }

    #[test]
    fn read_guard_hides_existence_from_non_parties() {
        let dispute = dispute_between(UserId::new(), UserId::new());
        assert_eq!(
            require_party_for_read(&dispute, UserId::new()).unwrap_err(),
            DomainError::NotFound
        );
    }
}
