//! Priority ordering over findings
//!
//! Read-only view consumed by the dashboard and report collaborators.
//! Primary key: severity rank (critical first). Secondary: scanner-reported
//! confidence, descending. Tertiary: AI priority score, descending, when the
//! finding has been enriched.

use std::cmp::Ordering;

use crate::Finding;

/// Comparator implementing the triage total order.
pub fn compare(a: &Finding, b: &Finding) -> Ordering {
    let a_score = a.enrichment.as_ref().map(|e| e.priority_score);
    let b_score = b.enrichment.as_ref().map(|e| e.priority_score);

    a.severity
        .rank()
        .cmp(&b.severity.rank())
        .then(b.confidence.cmp(&a.confidence))
        .then(b_score.cmp(&a_score))
}

/// Sort findings in place, most urgent first.
pub fn rank(findings: &mut [Finding]) {
    findings.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Enrichment, FindingStatus, Severity};
    use chrono::Utc;
    use uuid::Uuid;

    fn finding(severity: Severity, confidence: i32) -> Finding {
        Finding {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            scan_id: "scan-1".to_string(),
            tool: "semgrep".to_string(),
            severity,
            title: format!("{severity} finding"),
            description: String::new(),
            location: String::new(),
            line_number: None,
            confidence,
            status: FindingStatus::Open,
            enrichment: None,
            created_at: Utc::now(),
        }
    }

    fn enriched(severity: Severity, confidence: i32, score: i32) -> Finding {
        let mut f = finding(severity, confidence);
        f.enrichment = Some(Enrichment {
            recommendations: vec!["fix it".to_string()],
            priority_score: score,
            group_id: "g".to_string(),
            business_impact: crate::BusinessImpact::Medium,
        });
        f
    }

    #[test]
    fn orders_by_severity_first() {
        let mut findings = vec![
            finding(Severity::Info, 90),
            finding(Severity::Critical, 10),
            finding(Severity::Medium, 99),
            finding(Severity::High, 50),
        ];
        rank(&mut findings);

        let severities: Vec<Severity> = findings.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Critical,
                Severity::High,
                Severity::Medium,
                Severity::Info
            ]
        );
    }

    #[test]
    fn confidence_breaks_severity_ties() {
        let mut findings = vec![
            finding(Severity::High, 40),
            finding(Severity::High, 95),
            finding(Severity::High, 70),
        ];
        rank(&mut findings);

        let confidences: Vec<i32> = findings.iter().map(|f| f.confidence).collect();
        assert_eq!(confidences, vec![95, 70, 40]);
    }

    #[test]
    fn ai_score_breaks_remaining_ties() {
        let mut findings = vec![
            enriched(Severity::Medium, 70, 20),
            enriched(Severity::Medium, 70, 90),
            finding(Severity::Medium, 70),
        ];
        rank(&mut findings);

        let scores: Vec<Option<i32>> = findings
            .iter()
            .map(|f| f.enrichment.as_ref().map(|e| e.priority_score))
            .collect();
        assert_eq!(scores, vec![Some(90), Some(20), None]);
    }
}
