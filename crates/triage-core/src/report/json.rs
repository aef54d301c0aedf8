//! JSON report generation

use serde::Serialize;

use crate::{severity_counts, CoreError, CoreResult, Finding, Project};

#[derive(Serialize)]
struct ReportDocument<'a> {
    project: &'a Project,
    total_findings: usize,
    severity_counts: Vec<SeverityCount>,
    findings: &'a [Finding],
}

#[derive(Serialize)]
struct SeverityCount {
    severity: &'static str,
    count: usize,
}

pub fn generate(project: &Project, findings: &[Finding]) -> CoreResult<String> {
    let document = ReportDocument {
        project,
        total_findings: findings.len(),
        severity_counts: severity_counts(findings)
            .into_iter()
            .map(|(severity, count)| SeverityCount {
                severity: severity.as_str(),
                count,
            })
            .collect(),
        findings,
    };

    serde_json::to_string_pretty(&document)
        .map_err(|e| CoreError::Render(format!("JSON serialization failed: {}", e)))
}
