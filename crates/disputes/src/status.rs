//! Dispute status lifecycle and the authoritative transition table.

use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult};

/// Dispute workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    UnderReview,
    SellerResponded,
    Resolved,
    Rejected,
    Escalated,
    Closed,
}

impl DisputeStatus {
    /// Wire/label form, matching the serde encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Open => "open",
            DisputeStatus::UnderReview => "under_review",
            DisputeStatus::SellerResponded => "seller_responded",
            DisputeStatus::Resolved => "resolved",
            DisputeStatus::Rejected => "rejected",
            DisputeStatus::Escalated => "escalated",
            DisputeStatus::Closed => "closed",
        }
    }

    /// All statuses, for exhaustive table checks.
    pub const ALL: [DisputeStatus; 7] = [
        DisputeStatus::Open,
        DisputeStatus::UnderReview,
        DisputeStatus::SellerResponded,
        DisputeStatus::Resolved,
        DisputeStatus::Rejected,
        DisputeStatus::Escalated,
        DisputeStatus::Closed,
    ];

    /// Legal next statuses from this one. `Closed` is terminal.
    pub fn allowed_transitions(&self) -> &'static [DisputeStatus] {
        match self {
            DisputeStatus::Open => &[DisputeStatus::UnderReview, DisputeStatus::Closed],
            DisputeStatus::UnderReview => {
                &[DisputeStatus::SellerResponded, DisputeStatus::Escalated]
            }
            DisputeStatus::SellerResponded => &[
                DisputeStatus::Resolved,
                DisputeStatus::Rejected,
                DisputeStatus::Escalated,
            ],
            DisputeStatus::Resolved => &[DisputeStatus::Closed],
            DisputeStatus::Rejected => &[DisputeStatus::Escalated, DisputeStatus::Closed],
            DisputeStatus::Escalated => &[DisputeStatus::Resolved, DisputeStatus::Closed],
            DisputeStatus::Closed => &[],
        }
    }

    /// Pure table lookup.
    pub fn can_transition_to(&self, to: DisputeStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// No outgoing transitions remain.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisputeStatus::Closed)
    }

    /// Statuses that count as an active case for the
    /// one-active-dispute-per-order invariant.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            DisputeStatus::Open
                | DisputeStatus::UnderReview
                | DisputeStatus::SellerResponded
                | DisputeStatus::Escalated
        )
    }

    /// Statuses on which evidence may still be added.
    pub fn accepts_evidence(&self) -> bool {
        !matches!(self, DisputeStatus::Resolved | DisputeStatus::Closed)
    }
}

impl core::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a requested transition against the table.
///
/// Callers must not mutate state or append an audit event when this fails.
pub fn ensure_transition(from: DisputeStatus, to: DisputeStatus) -> DomainResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(DomainError::invalid_transition(from.as_str(), to.as_str()))
    }
}
