//! Triage Core
//!
//! Canonical domain model for the finding-triage pipeline: normalized
//! findings, scans, projects, and the pure policies (fallback enrichment,
//! priority ordering, report rendering) that operate on them.

pub mod fallback;
pub mod normalize;
pub mod priority;
pub mod report;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use normalize::{normalize_finding, normalize_payload, NormalizedFinding};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Render error: {0}")]
    Render(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Parse a scanner-reported severity string. Unrecognized values yield
    /// `None` so callers can apply their own default.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Display rank: lower sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business impact classification attached during enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessImpact {
    High,
    Medium,
    Low,
}

impl BusinessImpact {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Some(BusinessImpact::High),
            "medium" => Some(BusinessImpact::Medium),
            "low" => Some(BusinessImpact::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessImpact::High => "high",
            BusinessImpact::Medium => "medium",
            BusinessImpact::Low => "low",
        }
    }
}

impl std::fmt::Display for BusinessImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan lifecycle. Transitions are monotonic: pending -> processing ->
/// completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Processing,
    Completed,
}

impl ScanStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(ScanStatus::Pending),
            "processing" => Some(ScanStatus::Processing),
            "completed" => Some(ScanStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Processing => "processing",
            ScanStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding triage state. Only `Open` is assigned by this pipeline; the rest
/// belong to downstream triage workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    Resolved,
    FalsePositive,
}

impl FindingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Some(FindingStatus::Open),
            "resolved" => Some(FindingStatus::Resolved),
            "false_positive" => Some(FindingStatus::FalsePositive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Open => "open",
            FindingStatus::Resolved => "resolved",
            FindingStatus::FalsePositive => "false_positive",
        }
    }
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project owning scans, keyed by its repository identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub github_repo: String,
    pub created_at: DateTime<Utc>,
}

/// One ingestion batch from one tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub id: String,
    pub project_id: Uuid,
    pub tool: String,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_findings: i32,
    pub high_severity: i32,
    pub medium_severity: i32,
    pub low_severity: i32,
    pub info_severity: i32,
}

/// Enrichment verdict attached to a finding. The group is all-or-nothing:
/// a finding either carries the full verdict or none of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub recommendations: Vec<String>,
    pub priority_score: i32,
    pub group_id: String,
    pub business_impact: BusinessImpact,
}

/// One persisted finding instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: Uuid,
    pub project_id: Uuid,
    pub scan_id: String,
    pub tool: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub location: String,
    pub line_number: Option<i32>,
    pub confidence: i32,
    pub status: FindingStatus,
    pub enrichment: Option<Enrichment>,
    pub created_at: DateTime<Utc>,
}

/// Count findings per severity level, in display order.
pub fn severity_counts(findings: &[Finding]) -> [(Severity, usize); 5] {
    let mut counts = [
        (Severity::Critical, 0),
        (Severity::High, 0),
        (Severity::Medium, 0),
        (Severity::Low, 0),
        (Severity::Info, 0),
    ];
    for finding in findings {
        counts[finding.severity.rank() as usize].1 += 1;
    }
    counts
}
