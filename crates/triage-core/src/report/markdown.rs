//! Markdown and HTML report generation

use std::fmt::Write;

use crate::{severity_counts, Finding, Project, Severity};

/// Generate a markdown report: severity statistics followed by the
/// enumerated finding list.
pub fn generate(project: &Project, findings: &[Finding]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Security Report - {}", project.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "**Repository:** {}", project.github_repo);
    let _ = writeln!(out);

    let _ = writeln!(out, "## Statistics");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Findings: {}", findings.len());
    for (severity, count) in severity_counts(findings) {
        let _ = writeln!(out, "- {}: {}", label(severity), count);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Findings");
    let _ = writeln!(out);

    for (index, finding) in findings.iter().enumerate() {
        let _ = writeln!(
            out,
            "### {}. {} [{}]",
            index + 1,
            finding.title,
            finding.severity.as_str().to_uppercase()
        );
        if !finding.description.is_empty() {
            let _ = writeln!(out, "{}", finding.description);
        }
        if !finding.location.is_empty() {
            match finding.line_number {
                Some(line) => {
                    let _ = writeln!(out, "Location: {}:{}", finding.location, line);
                }
                None => {
                    let _ = writeln!(out, "Location: {}", finding.location);
                }
            }
        }
        let _ = writeln!(out, "Confidence: {}/100", finding.confidence);

        if let Some(enrichment) = &finding.enrichment {
            let _ = writeln!(
                out,
                "Business impact: {} (priority score {})",
                enrichment.business_impact, enrichment.priority_score
            );
            for recommendation in &enrichment.recommendations {
                let _ = writeln!(out, "- {}", recommendation);
            }
        }
        let _ = writeln!(out);
    }

    out
}

/// Generate a standalone HTML report with severity-colored finding cards.
pub fn generate_html(project: &Project, findings: &[Finding]) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Security Report - {name}</title>
  <style>
    body {{ font-family: Arial, sans-serif; padding: 40px; line-height: 1.6; }}
    h1 {{ color: #333; }}
    .stats {{ display: flex; gap: 20px; margin: 30px 0; }}
    .stat {{ background: #f5f5f5; padding: 15px 20px; border-radius: 8px; }}
    .stat strong {{ display: block; font-size: 24px; }}
    .finding {{ margin: 20px 0; padding: 15px; border-left: 4px solid #ca8a04; background: #fafafa; }}
    .finding.critical {{ border-left-color: #dc2626; }}
    .finding.high {{ border-left-color: #ea580c; }}
    .finding.medium {{ border-left-color: #ca8a04; }}
    .finding.low {{ border-left-color: #2563eb; }}
    .finding.info {{ border-left-color: #6b7280; }}
    .severity {{ font-weight: bold; text-transform: uppercase; }}
  </style>
</head>
<body>
  <h1>Security Report - {name}</h1>
  <p><strong>Repository:</strong> {repo}</p>
  <div class="stats">
    <div class="stat"><strong>{total}</strong><span>Total Findings</span></div>
"#,
        name = escape(&project.name),
        repo = escape(&project.github_repo),
        total = findings.len(),
    );

    for (severity, count) in severity_counts(findings) {
        let _ = write!(
            out,
            "    <div class=\"stat\"><strong>{}</strong><span>{}</span></div>\n",
            count,
            label(severity)
        );
    }
    let _ = write!(out, "  </div>\n  <h2>Findings</h2>\n");

    for (index, finding) in findings.iter().enumerate() {
        let _ = write!(
            out,
            r#"  <div class="finding {sev}">
    <div><strong>{n}. {title}</strong> <span class="severity">{sev}</span></div>
    <p>{description}</p>
    <p>Location: {location} Line: {line}</p>
"#,
            sev = finding.severity.as_str(),
            n = index + 1,
            title = escape(&finding.title),
            description = escape(&finding.description),
            location = escape(&finding.location),
            line = finding
                .line_number
                .map(|l| l.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        );

        if let Some(enrichment) = &finding.enrichment {
            let _ = write!(out, "    <ul>\n");
            for recommendation in &enrichment.recommendations {
                let _ = write!(out, "      <li>{}</li>\n", escape(recommendation));
            }
            let _ = write!(out, "    </ul>\n");
        }
        let _ = write!(out, "  </div>\n");
    }

    let _ = write!(out, "</body>\n</html>\n");
    out
}

fn label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::High => "High",
        Severity::Medium => "Medium",
        Severity::Low => "Low",
        Severity::Info => "Info",
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Enrichment, FindingStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn project() -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "payments".to_string(),
            github_repo: "acme/payments".to_string(),
            created_at: Utc::now(),
        }
    }

    fn finding(severity: Severity, title: &str) -> Finding {
        Finding {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            scan_id: "scan-1".to_string(),
            tool: "semgrep".to_string(),
            severity,
            title: title.to_string(),
            description: "tainted input reaches query".to_string(),
            location: "src/db.rs".to_string(),
            line_number: Some(42),
            confidence: 90,
            status: FindingStatus::Open,
            enrichment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn markdown_contains_counts_and_titles() {
        let findings = vec![
            finding(Severity::Critical, "SQL injection"),
            finding(Severity::Low, "Verbose logging"),
        ];
        let report = generate(&project(), &findings);

        assert!(report.contains("Total Findings: 2"));
        assert!(report.contains("- Critical: 1"));
        assert!(report.contains("- Low: 1"));
        assert!(report.contains("- Medium: 0"));
        assert!(report.contains("1. SQL injection [CRITICAL]"));
        assert!(report.contains("Location: src/db.rs:42"));
    }

    #[test]
    fn markdown_includes_recommendations_when_enriched() {
        let mut f = finding(Severity::High, "SSRF");
        f.enrichment = Some(Enrichment {
            recommendations: vec!["Validate outbound hosts".to_string()],
            priority_score: 80,
            group_id: "net-egress".to_string(),
            business_impact: crate::BusinessImpact::High,
        });
        let report = generate(&project(), &[f]);

        assert!(report.contains("Business impact: high (priority score 80)"));
        assert!(report.contains("- Validate outbound hosts"));
    }

    #[test]
    fn html_escapes_scanner_controlled_text() {
        let f = finding(Severity::Medium, "<script>alert(1)</script>");
        let html = generate_html(&project(), &[f]);

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("class=\"finding medium\""));
    }
}
