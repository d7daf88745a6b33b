// 📊 Analytics Aggregator - Decision history summaries for dashboards

use crate::ledger::{DecisionLedger, LedgerEntry};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

// ============================================================================
// DECISION SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub total: usize,
    pub violation_count: usize,
    pub safe_count: usize,
    /// Count per raw decision value, unrecognized values included
    pub decision_ratio: BTreeMap<String, usize>,
    /// Count per raw priority label
    pub priority_counts: BTreeMap<String, usize>,
}

impl DecisionSummary {
    /// Share of violations among all entries, 0.0 when there are none
    pub fn violation_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.violation_count as f64 / self.total as f64
        }
    }

    /// Entries whose decision is neither SAFE nor VIOLATION
    pub fn uncategorized_count(&self) -> usize {
        self.total - self.violation_count - self.safe_count
    }

    pub fn summary(&self) -> String {
        format!(
            "{} processed: {} violations, {} safe ({:.1}% violation rate)",
            self.total,
            self.violation_count,
            self.safe_count,
            self.violation_rate() * 100.0
        )
    }
}

/// Count decisions by exact value
pub fn summarize(entries: &[LedgerEntry]) -> DecisionSummary {
    let mut summary = DecisionSummary {
        total: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        match entry.decision.as_str() {
            "VIOLATION" => summary.violation_count += 1,
            "SAFE" => summary.safe_count += 1,
            _ => {}
        }

        *summary
            .decision_ratio
            .entry(entry.decision.clone())
            .or_insert(0) += 1;
        *summary
            .priority_counts
            .entry(entry.priority.clone())
            .or_insert(0) += 1;
    }

    summary
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// Everything the analytics view shows, read in one pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    pub summary: DecisionSummary,
    /// Most recent entries, oldest first
    pub recent: Vec<LedgerEntry>,
}

pub fn dashboard(ledger: &DecisionLedger, recent_limit: usize) -> Result<Dashboard> {
    let entries = ledger.read_all()?;
    let summary = summarize(&entries);
    let skip = entries.len().saturating_sub(recent_limit);

    Ok(Dashboard {
        summary,
        recent: entries.into_iter().skip(skip).collect(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Priority;
    use crate::ledger::Decision;
    use tempfile::TempDir;

    fn entry(priority: &str, decision: &str) -> LedgerEntry {
        LedgerEntry {
            timestamp: "2026-10-19 09:00:00".to_string(),
            original_text: "text".to_string(),
            flags: "[]".to_string(),
            priority: priority.to_string(),
            decision: decision.to_string(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.violation_count, 0);
        assert_eq!(summary.safe_count, 0);
        assert!(summary.decision_ratio.is_empty());
        assert_eq!(summary.violation_rate(), 0.0);
    }

    #[test]
    fn test_counts_by_exact_decision() {
        let entries = vec![
            entry("Critical", "VIOLATION"),
            entry("Low", "SAFE"),
            entry("Low", "SAFE"),
            entry("Medium", "safe"),
            entry("High", "ESCALATED"),
        ];
        let summary = summarize(&entries);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.violation_count, 1);
        assert_eq!(summary.safe_count, 2);
        assert_eq!(summary.uncategorized_count(), 2);
        assert_eq!(summary.decision_ratio.get("SAFE"), Some(&2));
        assert_eq!(summary.decision_ratio.get("safe"), Some(&1));
        assert_eq!(summary.decision_ratio.get("ESCALATED"), Some(&1));
        assert_eq!(summary.priority_counts.get("Low"), Some(&2));
        assert!((summary.violation_rate() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_summary_line() {
        let entries = vec![
            entry("High", "VIOLATION"),
            entry("Low", "SAFE"),
            entry("Low", "SAFE"),
            entry("Low", "SAFE"),
        ];

        assert_eq!(
            summarize(&entries).summary(),
            "4 processed: 1 violations, 3 safe (25.0% violation rate)"
        );
        assert_eq!(
            summarize(&[]).summary(),
            "0 processed: 0 violations, 0 safe (0.0% violation rate)"
        );
    }

    #[test]
    fn test_dashboard_on_missing_ledger() {
        let dir = TempDir::new().unwrap();
        let ledger = DecisionLedger::new(dir.path().join("none.csv"));

        let dash = dashboard(&ledger, DEFAULT_RECENT_LIMIT).unwrap();
        assert_eq!(dash.summary, DecisionSummary::default());
        assert!(dash.recent.is_empty());
    }

    #[test]
    fn test_dashboard_from_ledger() {
        let dir = TempDir::new().unwrap();
        let ledger = DecisionLedger::new(dir.path().join("log.csv"));

        for i in 0..15 {
            let decision = if i % 5 == 0 { Decision::Violation } else { Decision::Safe };
            ledger
                .append(&format!("msg {}", i), &[], Priority::Low, decision)
                .unwrap();
        }

        let dash = dashboard(&ledger, 10).unwrap();
        assert_eq!(dash.summary.total, 15);
        assert_eq!(dash.summary.violation_count, 3);
        assert_eq!(dash.summary.safe_count, 12);
        assert_eq!(dash.recent.len(), 10);
        assert_eq!(dash.recent[0].original_text, "msg 5");
        assert_eq!(dash.recent[9].original_text, "msg 14");
    }
}
