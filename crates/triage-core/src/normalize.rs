//! Webhook payload normalization
//!
//! Maps arbitrary per-tool webhook payloads into the canonical finding
//! shape. The top-level payload must carry a `findings` array; individual
//! elements are coerced with defaults rather than rejected, so a partially
//! well-formed batch is never partially dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CoreError, CoreResult, Severity};

/// Confidence assigned when a scanner reports none.
pub const DEFAULT_CONFIDENCE: i32 = 70;

/// A finding as accepted from a webhook, before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFinding {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub location: String,
    pub line_number: Option<i32>,
    pub confidence: i32,
}

/// Extract and normalize the findings array from a raw webhook payload.
pub fn normalize_payload(payload: &Value) -> CoreResult<Vec<NormalizedFinding>> {
    let findings = payload
        .get("findings")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::Validation("No findings in payload".to_string()))?;

    Ok(findings.iter().map(normalize_finding).collect())
}

/// Normalize a single raw finding element, applying defaults for anything
/// missing or malformed.
pub fn normalize_finding(raw: &Value) -> NormalizedFinding {
    let severity = raw
        .get("severity")
        .and_then(Value::as_str)
        .and_then(Severity::parse)
        .unwrap_or(Severity::Medium);

    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let description = raw
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let location = raw
        .get("location")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let line_number = raw
        .get("line_number")
        .and_then(Value::as_i64)
        .map(|n| n as i32);

    let confidence = raw
        .get("confidence")
        .and_then(Value::as_i64)
        .map(|n| n.clamp(0, 100) as i32)
        .unwrap_or(DEFAULT_CONFIDENCE);

    NormalizedFinding {
        severity,
        title,
        description,
        location,
        line_number,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_payload_without_findings() {
        let err = normalize_payload(&json!({"scan_id": "scan-1"})).unwrap_err();
        assert_eq!(err.to_string(), "No findings in payload");
    }

    #[test]
    fn rejects_non_array_findings() {
        assert!(normalize_payload(&json!({"findings": "nope"})).is_err());
        assert!(normalize_payload(&json!({"findings": {"a": 1}})).is_err());
    }

    #[test]
    fn accepts_empty_findings_array() {
        let findings = normalize_payload(&json!({"findings": []})).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn preserves_batch_length() {
        let payload = json!({"findings": [{}, {"title": "a"}, 42, null]});
        let findings = normalize_payload(&payload).unwrap();
        assert_eq!(findings.len(), 4);
    }

    #[test]
    fn fully_specified_finding_passes_through() {
        let finding = normalize_finding(&json!({
            "severity": "critical",
            "title": "SQLi",
            "description": "tainted query",
            "location": "src/db.rs",
            "line_number": 42,
            "confidence": 98
        }));
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.title, "SQLi");
        assert_eq!(finding.description, "tainted query");
        assert_eq!(finding.location, "src/db.rs");
        assert_eq!(finding.line_number, Some(42));
        assert_eq!(finding.confidence, 98);
    }

    #[test]
    fn applies_defaults_to_empty_element() {
        let finding = normalize_finding(&json!({}));
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.title, "Unknown");
        assert_eq!(finding.description, "");
        assert_eq!(finding.location, "");
        assert_eq!(finding.line_number, None);
        assert_eq!(finding.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn unrecognized_severity_defaults_to_medium() {
        let finding = normalize_finding(&json!({"severity": "catastrophic"}));
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn non_string_fields_are_coerced() {
        let finding = normalize_finding(&json!({
            "severity": 9,
            "title": ["not", "a", "string"],
            "line_number": "forty-two",
            "confidence": "high"
        }));
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.title, "Unknown");
        assert_eq!(finding.line_number, None);
        assert_eq!(finding.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn confidence_is_clamped_to_percentage_range() {
        assert_eq!(
            normalize_finding(&json!({"confidence": 250})).confidence,
            100
        );
        assert_eq!(normalize_finding(&json!({"confidence": -5})).confidence, 0);
    }
}
