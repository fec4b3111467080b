//! Performance aggregates and dashboard/analytics rollups.
//!
//! Same accumulation style throughout: one pass over the items, counters
//! grouped in a map, finalized into ordered records.

use crate::model::{ConfidenceBand, MailItem, MailStatus};
use serde::Serialize;
use std::collections::HashMap;

/// Per-operator performance counters.
///
/// Grouped by the stable uploader id; the display name is metadata only and
/// never the grouping key, so operators sharing a name stay distinct.
#[derive(Debug, Clone, Serialize)]
pub struct OperatorStats {
    pub operator_id: String,
    pub operator_name: String,
    pub scanned: u64,
    pub auto_routed: u64,
    pub reviewed: u64,
    pub total_time_secs: u64,
}

impl OperatorStats {
    fn new(operator_id: &str, operator_name: &str) -> Self {
        OperatorStats {
            operator_id: operator_id.to_string(),
            operator_name: operator_name.to_string(),
            scanned: 0,
            auto_routed: 0,
            reviewed: 0,
            total_time_secs: 0,
        }
    }

    /// Integer-rounded mean processing time. Items without a recorded time
    /// still count in the divisor and contribute nothing to the sum, so the
    /// average skews low when times are missing. Matches the source system;
    /// see DESIGN.md before changing the divisor.
    pub fn avg_time(&self) -> u32 {
        if self.scanned == 0 {
            return 0;
        }
        (self.total_time_secs as f64 / self.scanned as f64).round() as u32
    }

    /// Share of scanned items that were auto-routed, rounded to whole
    /// percent. 0 when nothing was scanned.
    pub fn auto_route_percentage(&self) -> u32 {
        if self.scanned == 0 {
            return 0;
        }
        (self.auto_routed as f64 / self.scanned as f64 * 100.0).round() as u32
    }
}

/// Group items by uploader and accumulate performance counters.
///
/// `auto_routed` counts items routed with confidence strictly above the
/// threshold; everything else in the group lands in `reviewed`, so
/// `scanned == auto_routed + reviewed` always holds. Output is sorted
/// descending by `scanned` (stable, so equal groups keep first-appearance
/// order).
pub fn operator_performance<'a, I>(items: I, threshold: u8) -> Vec<OperatorStats>
where
    I: IntoIterator<Item = &'a MailItem>,
{
    let mut groups: HashMap<String, OperatorStats> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for item in items {
        let stats = groups.entry(item.uploaded_by.clone()).or_insert_with(|| {
            order.push(item.uploaded_by.clone());
            OperatorStats::new(&item.uploaded_by, &item.uploaded_by_name)
        });

        stats.scanned += 1;
        if item.is_auto_routed(threshold) {
            stats.auto_routed += 1;
        } else {
            stats.reviewed += 1;
        }
        stats.total_time_secs += u64::from(item.processing_time.unwrap_or(0));
    }

    let mut result: Vec<OperatorStats> = order
        .into_iter()
        .filter_map(|id| groups.remove(&id))
        .collect();
    result.sort_by(|a, b| b.scanned.cmp(&a.scanned));
    result
}

/// Confidence distribution across the fixed bands.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfidenceDistribution {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

/// Dashboard tiles and analytics rollups over a collection.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub total: u64,
    /// Pending and ambiguous items awaiting a decision.
    pub in_queue: u64,
    pub auto_routed: u64,
    pub needs_review: u64,
    pub escalated: u64,
    pub total_time_secs: u64,
    /// Counts per status in fixed status order.
    pub status_breakdown: Vec<(MailStatus, u64)>,
    pub confidence_distribution: ConfidenceDistribution,
    /// Suggestion flag tallies, count descending (name ascending on ties).
    pub flag_tallies: Vec<(String, u64)>,
}

impl GlobalStats {
    pub fn collect<'a, I>(items: I, threshold: u8) -> Self
    where
        I: IntoIterator<Item = &'a MailItem>,
    {
        let mut stats = GlobalStats {
            total: 0,
            in_queue: 0,
            auto_routed: 0,
            needs_review: 0,
            escalated: 0,
            total_time_secs: 0,
            status_breakdown: Vec::new(),
            confidence_distribution: ConfidenceDistribution::default(),
            flag_tallies: Vec::new(),
        };

        let mut by_status: HashMap<MailStatus, u64> = HashMap::new();
        let mut flags: HashMap<String, u64> = HashMap::new();

        for item in items {
            stats.total += 1;
            *by_status.entry(item.status).or_insert(0) += 1;
            match item.status {
                MailStatus::Pending | MailStatus::Ambiguous => stats.in_queue += 1,
                MailStatus::Escalated => stats.escalated += 1,
                _ => {}
            }
            if item.is_auto_routed(threshold) {
                stats.auto_routed += 1;
            }
            if item.needs_review {
                stats.needs_review += 1;
            }
            stats.total_time_secs += u64::from(item.processing_time.unwrap_or(0));

            match item.confidence_band() {
                ConfidenceBand::High => stats.confidence_distribution.high += 1,
                ConfidenceBand::Medium => stats.confidence_distribution.medium += 1,
                ConfidenceBand::Low => stats.confidence_distribution.low += 1,
            }
            for flag in &item.suggestion.flags {
                *flags.entry(flag.clone()).or_insert(0) += 1;
            }
        }

        stats.status_breakdown = MailStatus::ALL
            .iter()
            .map(|status| (*status, by_status.get(status).copied().unwrap_or(0)))
            .collect();

        let mut tallies: Vec<(String, u64)> = flags.into_iter().collect();
        tallies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats.flag_tallies = tallies;

        stats
    }

    /// Same skewed mean as [`OperatorStats::avg_time`], over all items.
    pub fn avg_processing_time(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.total_time_secs as f64 / self.total as f64).round() as u32
    }

    pub fn auto_route_percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.auto_routed as f64 / self.total as f64 * 100.0).round() as u32
    }
}

/// Per-center volume and turnaround, first-appearance order.
#[derive(Debug, Clone, Serialize)]
pub struct CenterSummary {
    pub center: String,
    pub scanned: u64,
    pub total_time_secs: u64,
}

impl CenterSummary {
    pub fn avg_time(&self) -> u32 {
        if self.scanned == 0 {
            return 0;
        }
        (self.total_time_secs as f64 / self.scanned as f64).round() as u32
    }
}

pub fn center_summary<'a, I>(items: I) -> Vec<CenterSummary>
where
    I: IntoIterator<Item = &'a MailItem>,
{
    let mut groups: HashMap<String, CenterSummary> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for item in items {
        let summary = groups.entry(item.center.clone()).or_insert_with(|| {
            order.push(item.center.clone());
            CenterSummary {
                center: item.center.clone(),
                scanned: 0,
                total_time_secs: 0,
            }
        });
        summary.scanned += 1;
        summary.total_time_secs += u64::from(item.processing_time.unwrap_or(0));
    }

    order.into_iter().filter_map(|c| groups.remove(&c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(uploaded_by: &str, status: MailStatus, confidence: u8) -> MailItem {
        MailItem {
            id: format!("MAIL-{uploaded_by}-{confidence}"),
            uploaded_by: uploaded_by.to_string(),
            uploaded_by_name: uploaded_by.to_string(),
            status,
            confidence,
            ..Default::default()
        }
    }

    #[test]
    fn test_spec_scenario_single_operator() {
        let items = vec![
            item("op1", MailStatus::Routed, 90),
            item("op1", MailStatus::Pending, 60),
        ];

        let perf = operator_performance(&items, 85);
        assert_eq!(perf.len(), 1);
        assert_eq!(perf[0].operator_id, "op1");
        assert_eq!(perf[0].scanned, 2);
        assert_eq!(perf[0].auto_routed, 1);
        assert_eq!(perf[0].reviewed, 1);
    }

    #[test]
    fn test_scanned_equals_auto_routed_plus_reviewed() {
        let items = vec![
            item("op1", MailStatus::Routed, 90),
            item("op1", MailStatus::Routed, 80), // routed but not above threshold
            item("op1", MailStatus::Approved, 95),
            item("op2", MailStatus::Pending, 50),
        ];

        for stats in operator_performance(&items, 85) {
            assert_eq!(stats.scanned, stats.auto_routed + stats.reviewed);
        }
    }

    #[test]
    fn test_auto_route_percentage_bounds() {
        let empty = OperatorStats::new("op1", "op1");
        assert_eq!(empty.auto_route_percentage(), 0);

        let items = vec![
            item("op1", MailStatus::Routed, 90),
            item("op1", MailStatus::Routed, 91),
            item("op1", MailStatus::Pending, 40),
        ];
        let perf = operator_performance(&items, 85);
        let pct = perf[0].auto_route_percentage();
        assert!(pct <= 100);
        assert_eq!(pct, 67); // round(2/3 * 100)
    }

    #[test]
    fn test_avg_time_counts_missing_times_in_divisor() {
        let mut timed = item("op1", MailStatus::Routed, 90);
        timed.processing_time = Some(40);
        let untimed = item("op1", MailStatus::Pending, 60);

        let perf = operator_performance(&[timed, untimed], 85);
        // 40 seconds over TWO scanned items, not one.
        assert_eq!(perf[0].avg_time(), 20);
    }

    #[test]
    fn test_groups_keyed_by_id_not_name() {
        let mut a = item("op1", MailStatus::Pending, 60);
        a.uploaded_by_name = "R. Kumar".to_string();
        let mut b = item("op2", MailStatus::Pending, 60);
        b.uploaded_by_name = "R. Kumar".to_string();

        let perf = operator_performance(&[a, b], 85);
        assert_eq!(perf.len(), 2);
    }

    #[test]
    fn test_sorted_descending_by_scanned() {
        let items = vec![
            item("op1", MailStatus::Pending, 60),
            item("op2", MailStatus::Pending, 60),
            item("op2", MailStatus::Pending, 62),
        ];
        let perf = operator_performance(&items, 85);
        assert_eq!(perf[0].operator_id, "op2");
        assert_eq!(perf[1].operator_id, "op1");
    }

    #[test]
    fn test_empty_items_empty_performance() {
        let no_items: Vec<MailItem> = Vec::new();
        assert!(operator_performance(&no_items, 85).is_empty());
        let stats = GlobalStats::collect(&no_items, 85);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_processing_time(), 0);
        assert_eq!(stats.auto_route_percentage(), 0);
    }

    #[test]
    fn test_global_stats_rollup() {
        let mut routed = item("op1", MailStatus::Routed, 92);
        routed.processing_time = Some(30);
        let mut pending = item("op1", MailStatus::Pending, 74);
        pending.needs_review = true;
        pending.suggestion.flags = vec!["Low confidence".to_string()];
        let mut ambiguous = item("op2", MailStatus::Ambiguous, 55);
        ambiguous.needs_review = true;
        ambiguous.suggestion.flags =
            vec!["Low confidence".to_string(), "Illegible text".to_string()];
        let escalated = item("op2", MailStatus::Escalated, 64);

        let stats = GlobalStats::collect(&[routed, pending, ambiguous, escalated], 85);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.in_queue, 2);
        assert_eq!(stats.auto_routed, 1);
        assert_eq!(stats.needs_review, 2);
        assert_eq!(stats.escalated, 1);
        assert_eq!(stats.confidence_distribution.high, 1);
        assert_eq!(stats.confidence_distribution.medium, 1);
        assert_eq!(stats.confidence_distribution.low, 2);
        assert_eq!(stats.flag_tallies[0], ("Low confidence".to_string(), 2));

        let by_status: std::collections::HashMap<_, _> =
            stats.status_breakdown.iter().cloned().collect();
        assert_eq!(by_status[&MailStatus::Routed], 1);
        assert_eq!(by_status[&MailStatus::Pending], 1);
        assert_eq!(by_status[&MailStatus::Approved], 0);
    }

    #[test]
    fn test_center_summary_orders_by_first_appearance() {
        let mut a = item("op1", MailStatus::Pending, 60);
        a.center = "Mumbai Central".to_string();
        a.processing_time = Some(50);
        let mut b = item("op2", MailStatus::Pending, 60);
        b.center = "Delhi Central".to_string();
        let mut c = item("op3", MailStatus::Pending, 60);
        c.center = "Mumbai Central".to_string();

        let summary = center_summary(&[a, b, c]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].center, "Mumbai Central");
        assert_eq!(summary[0].scanned, 2);
        assert_eq!(summary[0].avg_time(), 25);
        assert_eq!(summary[1].center, "Delhi Central");
    }
}
