//! Report generation

pub mod json;
pub mod markdown;

use crate::{CoreResult, Finding, Project};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Html,
}

impl ReportFormat {
    /// Parse a `?format=` query value; unknown values fall back to markdown.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => ReportFormat::Json,
            "html" => ReportFormat::Html,
            _ => ReportFormat::Markdown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Markdown => "text/markdown",
            ReportFormat::Html => "text/html",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }
}

/// Generate a report over findings in the specified format. Callers are
/// expected to pass findings already in priority order.
pub fn generate_report(
    project: &Project,
    findings: &[Finding],
    format: ReportFormat,
) -> CoreResult<String> {
    match format {
        ReportFormat::Json => json::generate(project, findings),
        ReportFormat::Markdown => Ok(markdown::generate(project, findings)),
        ReportFormat::Html => Ok(markdown::generate_html(project, findings)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parse_defaults_to_markdown() {
        assert_eq!(ReportFormat::parse("json"), ReportFormat::Json);
        assert_eq!(ReportFormat::parse("HTML"), ReportFormat::Html);
        assert_eq!(ReportFormat::parse("pdf"), ReportFormat::Markdown);
        assert_eq!(ReportFormat::parse(""), ReportFormat::Markdown);
    }
}
