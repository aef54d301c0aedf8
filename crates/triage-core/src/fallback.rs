//! Deterministic fallback enrichment
//!
//! Used whenever the AI analysis path is unavailable or returns something
//! untrustworthy. Recommendations are keyed on severity; business impact is
//! aggregated over the whole batch.

use crate::{BusinessImpact, Finding, Severity};

/// Group marker for findings enriched without AI correlation.
pub const AUTO_GROUP_ID: &str = "auto-grouped";

/// Confidence assigned by the fallback path, signaling reduced trust versus
/// an AI-derived score.
pub const FALLBACK_CONFIDENCE: i32 = 70;

/// Template recommendations for one finding, keyed on its severity.
pub fn recommendations(severity: Severity) -> Vec<String> {
    let lines: &[&str] = match severity {
        Severity::Critical => &[
            "Stop the release train and patch this immediately",
            "Rotate any credentials or secrets this issue may have exposed",
            "Add a regression test before closing the finding",
        ],
        Severity::High => &[
            "Schedule a fix in the next sprint",
            "Review surrounding code for the same vulnerability class",
        ],
        Severity::Medium => &[
            "Add to the security backlog with an owner",
            "Re-evaluate priority if the affected code path becomes externally reachable",
        ],
        Severity::Low => &[
            "Track as technical debt",
            "Bundle with the next scheduled refactor of the affected module",
        ],
        Severity::Info => &[
            "Optional cleanup, no action required",
            "Consider suppressing in the scanner config if noise",
        ],
    };
    lines.iter().map(|s| s.to_string()).collect()
}

/// Aggregate business impact over a batch: any critical finding dominates,
/// then the volume of high-severity findings.
pub fn business_impact(findings: &[Finding]) -> BusinessImpact {
    let criticals = findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count();
    let highs = findings
        .iter()
        .filter(|f| f.severity == Severity::High)
        .count();

    if criticals > 0 || highs > 2 {
        BusinessImpact::High
    } else if highs > 0 {
        BusinessImpact::Medium
    } else {
        BusinessImpact::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FindingStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn finding(severity: Severity) -> Finding {
        Finding {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            scan_id: "scan-1".to_string(),
            tool: "semgrep".to_string(),
            severity,
            title: "finding".to_string(),
            description: String::new(),
            location: String::new(),
            line_number: None,
            confidence: 70,
            status: FindingStatus::Open,
            enrichment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn every_severity_has_recommendations() {
        for severity in [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
            Severity::Info,
        ] {
            let recs = recommendations(severity);
            assert!(recs.len() >= 2, "{severity} template too short");
            assert!(recs.iter().all(|r| !r.is_empty()));
        }
    }

    #[test]
    fn any_critical_yields_high_impact() {
        let batch = vec![finding(Severity::Info), finding(Severity::Critical)];
        assert_eq!(business_impact(&batch), BusinessImpact::High);
    }

    #[test]
    fn more_than_two_highs_yields_high_impact() {
        let batch = vec![
            finding(Severity::High),
            finding(Severity::High),
            finding(Severity::High),
        ];
        assert_eq!(business_impact(&batch), BusinessImpact::High);
    }

    #[test]
    fn some_highs_yield_medium_impact() {
        let batch = vec![
            finding(Severity::High),
            finding(Severity::High),
            finding(Severity::Low),
        ];
        assert_eq!(business_impact(&batch), BusinessImpact::Medium);

        let batch = vec![finding(Severity::High)];
        assert_eq!(business_impact(&batch), BusinessImpact::Medium);
    }

    #[test]
    fn quiet_batch_yields_low_impact() {
        let batch = vec![
            finding(Severity::Medium),
            finding(Severity::Low),
            finding(Severity::Info),
        ];
        assert_eq!(business_impact(&batch), BusinessImpact::Low);
        assert_eq!(business_impact(&[]), BusinessImpact::Low);
    }
}
