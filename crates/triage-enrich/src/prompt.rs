//! Analysis prompt construction
//!
//! One prompt summarizes the whole batch; the provider is called once per
//! scan, never per finding.

use std::fmt::Write;

use triage_core::Finding;

/// System prompt pinning the provider to bare JSON output.
pub const SYSTEM_PROMPT: &str = "You are a security expert AI. Analyze these vulnerability findings and provide structured JSON output with the keys confidence_score (1-100), recommendations (2-4 concrete strings), business_impact (high|medium|low) and group_id (max 30 chars, correlates findings across tools).\n\nIMPORTANT: Return ONLY valid JSON. No markdown, no extra text.";

/// Render the batch of findings into the user prompt.
pub fn batch_prompt(findings: &[Finding]) -> String {
    let mut out = String::new();

    for (index, finding) in findings.iter().enumerate() {
        if index > 0 {
            out.push_str("\n\n---\n\n");
        }

        let _ = write!(
            out,
            "[{}] {} - {}\nSeverity: {}\nDescription: {}\nLocation: {}\nLine: {}\nConfidence: {}/100",
            finding.severity.as_str().to_uppercase(),
            finding.tool,
            finding.title,
            finding.severity,
            non_empty(&finding.description),
            non_empty(&finding.location),
            finding
                .line_number
                .map(|l| l.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            finding.confidence,
        );
    }

    out
}

fn non_empty(s: &str) -> &str {
    if s.is_empty() {
        "N/A"
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use triage_core::{FindingStatus, Severity};
    use uuid::Uuid;

    fn finding(severity: Severity, title: &str) -> Finding {
        Finding {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            scan_id: "scan-1".to_string(),
            tool: "trivy".to_string(),
            severity,
            title: title.to_string(),
            description: "outdated openssl".to_string(),
            location: "Cargo.lock".to_string(),
            line_number: Some(12),
            confidence: 85,
            status: FindingStatus::Open,
            enrichment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_carries_every_field() {
        let prompt = batch_prompt(&[finding(Severity::High, "CVE-2024-1234")]);

        assert!(prompt.contains("[HIGH] trivy - CVE-2024-1234"));
        assert!(prompt.contains("Severity: high"));
        assert!(prompt.contains("Description: outdated openssl"));
        assert!(prompt.contains("Location: Cargo.lock"));
        assert!(prompt.contains("Line: 12"));
        assert!(prompt.contains("Confidence: 85/100"));
    }

    #[test]
    fn prompt_separates_findings() {
        let prompt = batch_prompt(&[
            finding(Severity::High, "first"),
            finding(Severity::Low, "second"),
        ]);
        assert_eq!(prompt.matches("---").count(), 1);
        assert!(prompt.contains("first"));
        assert!(prompt.contains("second"));
    }

    #[test]
    fn empty_fields_render_as_na() {
        let mut f = finding(Severity::Info, "note");
        f.description = String::new();
        f.location = String::new();
        f.line_number = None;
        let prompt = batch_prompt(&[f]);

        assert!(prompt.contains("Description: N/A"));
        assert!(prompt.contains("Location: N/A"));
        assert!(prompt.contains("Line: N/A"));
    }
}
