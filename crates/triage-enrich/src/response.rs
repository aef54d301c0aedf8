//! Provider response parsing
//!
//! Providers sometimes wrap JSON in markdown code fences despite the system
//! prompt; the fences are stripped before deserialization. A verdict that
//! deserializes but violates its documented bounds is treated the same as a
//! malformed response.

use serde::Deserialize;

use triage_core::BusinessImpact;

use crate::{EnrichError, EnrichResult};

/// Maximum accepted group identifier length; longer values are truncated.
pub const MAX_GROUP_ID_LEN: usize = 30;

/// The batch verdict returned by the provider. One verdict covers the whole
/// scan; the caller applies it to every finding in the batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisVerdict {
    pub confidence_score: i32,
    pub recommendations: Vec<String>,
    pub business_impact: BusinessImpact,
    pub group_id: String,
}

/// Strip leading/trailing markdown code fences (```json ... ```), if any.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse and validate the verdict out of a raw completion body.
pub fn parse_verdict(content: &str) -> EnrichResult<AnalysisVerdict> {
    let body = strip_code_fences(content);

    let mut verdict: AnalysisVerdict = serde_json::from_str(body)
        .map_err(|e| EnrichError::Parse(format!("invalid verdict JSON: {}", e)))?;

    if !(1..=100).contains(&verdict.confidence_score) {
        return Err(EnrichError::Parse(format!(
            "confidence_score out of range: {}",
            verdict.confidence_score
        )));
    }

    verdict.recommendations.retain(|r| !r.trim().is_empty());
    if verdict.recommendations.is_empty() {
        return Err(EnrichError::Parse("no recommendations returned".to_string()));
    }

    if verdict.group_id.trim().is_empty() {
        return Err(EnrichError::Parse("empty group_id".to_string()));
    }
    if verdict.group_id.len() > MAX_GROUP_ID_LEN {
        verdict.group_id.truncate(MAX_GROUP_ID_LEN);
    }

    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERDICT: &str = r#"{
        "confidence_score": 85,
        "recommendations": ["Parameterize the query", "Add input validation"],
        "business_impact": "high",
        "group_id": "sql-injection"
    }"#;

    #[test]
    fn parses_bare_json() {
        let verdict = parse_verdict(VERDICT).unwrap();
        assert_eq!(verdict.confidence_score, 85);
        assert_eq!(verdict.recommendations.len(), 2);
        assert_eq!(verdict.business_impact, BusinessImpact::High);
        assert_eq!(verdict.group_id, "sql-injection");
    }

    #[test]
    fn strips_json_fence() {
        let fenced = format!("```json\n{}\n```", VERDICT);
        let verdict = parse_verdict(&fenced).unwrap();
        assert_eq!(verdict.group_id, "sql-injection");
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = format!("```\n{}\n```", VERDICT);
        assert!(parse_verdict(&fenced).is_ok());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let padded = format!("\n\n  ```json\n{}\n```  \n", VERDICT);
        assert!(parse_verdict(&padded).is_ok());
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_verdict("the findings look serious").is_err());
        assert!(parse_verdict("").is_err());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let raw = r#"{"confidence_score": 0, "recommendations": ["x"], "business_impact": "low", "group_id": "g"}"#;
        assert!(parse_verdict(raw).is_err());

        let raw = r#"{"confidence_score": 500, "recommendations": ["x"], "business_impact": "low", "group_id": "g"}"#;
        assert!(parse_verdict(raw).is_err());
    }

    #[test]
    fn rejects_empty_recommendations() {
        let raw = r#"{"confidence_score": 80, "recommendations": [], "business_impact": "low", "group_id": "g"}"#;
        assert!(parse_verdict(raw).is_err());

        let raw = r#"{"confidence_score": 80, "recommendations": ["  "], "business_impact": "low", "group_id": "g"}"#;
        assert!(parse_verdict(raw).is_err());
    }

    #[test]
    fn rejects_unknown_business_impact() {
        let raw = r#"{"confidence_score": 80, "recommendations": ["x"], "business_impact": "severe", "group_id": "g"}"#;
        assert!(parse_verdict(raw).is_err());
    }

    #[test]
    fn truncates_long_group_id() {
        let raw = format!(
            r#"{{"confidence_score": 80, "recommendations": ["x"], "business_impact": "low", "group_id": "{}"}}"#,
            "g".repeat(50)
        );
        let verdict = parse_verdict(&raw).unwrap();
        assert_eq!(verdict.group_id.len(), MAX_GROUP_ID_LEN);
    }
}
