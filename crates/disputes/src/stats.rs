//! Read-only rollups over a role-scoped set of disputes.

use serde::{Deserialize, Serialize};

use crate::model::Dispute;
use crate::status::DisputeStatus;

/// Aggregated dispute statistics for one party's case load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisputeStats {
    pub total: usize,
    pub open: usize,
    pub under_review: usize,
    pub seller_responded: usize,
    pub resolved: usize,
    pub rejected: usize,
    pub escalated: usize,
    pub closed: usize,
    /// `round((resolved + closed) / total * 100)`; 0 for an empty set.
    pub resolution_rate: u32,
    /// Mean of `closed_at - created_at` in days over resolved/closed disputes
    /// with a close timestamp, rounded to one decimal; 0 when none qualify.
    pub avg_resolution_days: f64,
}

impl DisputeStats {
    pub fn count_for(&self, status: DisputeStatus) -> usize {
        match status {
            DisputeStatus::Open => self.open,
            DisputeStatus::UnderReview => self.under_review,
            DisputeStatus::SellerResponded => self.seller_responded,
            DisputeStatus::Resolved => self.resolved,
            DisputeStatus::Rejected => self.rejected,
            DisputeStatus::Escalated => self.escalated,
            DisputeStatus::Closed => self.closed,
        }
    }
}

/// Compute the rollup for `disputes`.
pub fn aggregate(disputes: &[Dispute]) -> DisputeStats {
    let mut stats = DisputeStats {
        total: disputes.len(),
        ..Default::default()
    };

    for dispute in disputes {
        match dispute.status {
            DisputeStatus::Open => stats.open += 1,
            DisputeStatus::UnderReview => stats.under_review += 1,
            DisputeStatus::SellerResponded => stats.seller_responded += 1,
            DisputeStatus::Resolved => stats.resolved += 1,
            DisputeStatus::Rejected => stats.rejected += 1,
            DisputeStatus::Escalated => stats.escalated += 1,
            DisputeStatus::Closed => stats.closed += 1,
        }
    }

    if stats.total > 0 {
        let settled = (stats.resolved + stats.closed) as f64;
        stats.resolution_rate = ((settled / stats.total as f64) * 100.0).round() as u32;
    }

    let durations: Vec<f64> = disputes
        .iter()
        .filter(|d| matches!(d.status, DisputeStatus::Resolved | DisputeStatus::Closed))
        .filter_map(|d| d.closed_at.map(|closed| closed - d.created_at))
        .map(|elapsed| elapsed.num_seconds() as f64 / 86_400.0)
        .collect();
    if !durations.is_empty() {
        let mean = durations.iter().sum::<f64>() / durations.len() as f64;
        stats.avg_resolution_days = (mean * 10.0).round() / 10.0;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tradepost_core::{OrderId, UserId};
    use tradepost_orders::{OrderRecord, OrderStatus};

    use crate::model::DisputeReason;
    use crate::number::DisputeNumber;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap()
    }

    fn dispute_with(status: DisputeStatus, open_for_days: i64) -> Dispute {
        let order = OrderRecord {
            id: OrderId::new(),
            buyer_id: UserId::new(),
            seller_id: UserId::new(),
            buyer_name: "Ada".to_string(),
            seller_name: "Keycap Works".to_string(),
            item_name: "Cable".to_string(),
            quantity: 1,
            unit_price: 25,
            total_price: 25,
            status: OrderStatus::Delivered,
            delivered_at: Some(t0()),
            has_exception: false,
            exception_type: None,
        };
        let mut dispute = Dispute::open(
            DisputeNumber::first(2026),
            &order,
            None,
            DisputeReason::Other,
            "stats fixture".to_string(),
            None,
            None,
            Vec::new(),
            t0(),
        );
        dispute.status = status;
        if matches!(status, DisputeStatus::Resolved | DisputeStatus::Closed) {
            dispute.closed_at = Some(t0() + Duration::days(open_for_days));
        }
        dispute
    }

    #[test]
    fn empty_set_yields_zeroes() {
        let stats = aggregate(&[]);
        assert_eq!(stats, DisputeStats::default());
    }

    #[test]
    fn total_equals_sum_of_per_status_counts() {
        let disputes = vec![
            dispute_with(DisputeStatus::Open, 0),
            dispute_with(DisputeStatus::Open, 0),
            dispute_with(DisputeStatus::UnderReview, 0),
            dispute_with(DisputeStatus::Resolved, 2),
            dispute_with(DisputeStatus::Rejected, 0),
            dispute_with(DisputeStatus::Closed, 4),
        ];
        let stats = aggregate(&disputes);

        let sum: usize = DisputeStatus::ALL
            .iter()
            .map(|s| stats.count_for(*s))
            .sum();
        assert_eq!(stats.total, 6);
        assert_eq!(sum, stats.total);
    }

    #[test]
    fn resolution_rate_rounds_to_whole_percent() {
        let disputes = vec![
            dispute_with(DisputeStatus::Resolved, 1),
            dispute_with(DisputeStatus::Closed, 1),
            dispute_with(DisputeStatus::Open, 0),
        ];
        // 2/3 -> 66.66..% -> 67.
        assert_eq!(aggregate(&disputes).resolution_rate, 67);
    }

    #[test]
    fn avg_resolution_days_covers_only_settled_disputes() {
        let disputes = vec![
            dispute_with(DisputeStatus::Resolved, 2),
            dispute_with(DisputeStatus::Closed, 5),
            dispute_with(DisputeStatus::Open, 0),
            dispute_with(DisputeStatus::Escalated, 0),
        ];
        // (2 + 5) / 2 = 3.5 days.
        assert_eq!(aggregate(&disputes).avg_resolution_days, 3.5);
    }

    #[test]
    fn avg_is_rounded_to_one_decimal() {
        let mut fast = dispute_with(DisputeStatus::Resolved, 0);
        fast.closed_at = Some(t0() + Duration::hours(8));
        let disputes = vec![fast, dispute_with(DisputeStatus::Closed, 1)];
        // (0.333.. + 1.0) / 2 = 0.666.. -> 0.7.
        assert_eq!(aggregate(&disputes).avg_resolution_days, 0.7);
    }

    #[test]
    fn unsettled_only_set_has_zero_average() {
        let disputes = vec![
            dispute_with(DisputeStatus::Open, 0),
            dispute_with(DisputeStatus::Rejected, 0),
        ];
        let stats = aggregate(&disputes);
        assert_eq!(stats.avg_resolution_days, 0.0);
        assert_eq!(stats.resolution_rate, 0);
    }
}
