//! Database row types and their domain conversions
//!
//! Rows carry the raw column values; conversions re-establish the typed
//! invariants (closed enums, all-or-nothing enrichment) on the way out.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use triage_core::{
    BusinessImpact, Enrichment, Finding, FindingStatus, Project, Scan, ScanStatus, Severity,
};

#[derive(Debug, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub github_repo: String,
    pub created_at: DateTime<Utc>,
}

impl ProjectRow {
    pub fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            github_repo: self.github_repo,
            created_at: self.created_at,
        }
    }
}

/// Project joined with its aggregate finding counts, for the dashboard list.
#[derive(Debug, FromRow)]
pub struct ProjectSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub github_repo: String,
    pub created_at: DateTime<Utc>,
    pub total_findings: Option<i64>,
    pub high_severity: Option<i64>,
    pub medium_severity: Option<i64>,
}

#[derive(Debug, FromRow)]
pub struct ScanRow {
    pub id: String,
    pub project_id: Uuid,
    pub tool: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_findings: i32,
    pub high_severity: Option<i32>,
    pub medium_severity: Option<i32>,
    pub low_severity: Option<i32>,
    pub info_severity: Option<i32>,
}

impl ScanRow {
    pub fn into_scan(self) -> Scan {
        Scan {
            id: self.id,
            project_id: self.project_id,
            tool: self.tool,
            status: ScanStatus::parse(&self.status).unwrap_or(ScanStatus::Pending),
            started_at: self.started_at,
            completed_at: self.completed_at,
            total_findings: self.total_findings,
            high_severity: self.high_severity.unwrap_or(0),
            medium_severity: self.medium_severity.unwrap_or(0),
            low_severity: self.low_severity.unwrap_or(0),
            info_severity: self.info_severity.unwrap_or(0),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct FindingRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub scan_id: String,
    pub tool: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub line_number: Option<i32>,
    pub confidence: i32,
    pub status: String,
    pub ai_recommendations: Option<Vec<String>>,
    pub ai_priority_score: Option<i32>,
    pub ai_group_id: Option<String>,
    pub ai_business_impact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FindingRow {
    pub fn into_finding(self) -> Finding {
        // Enrichment is all-or-nothing: expose it only when every column is
        // present and well-formed.
        let enrichment = match (
            self.ai_recommendations,
            self.ai_priority_score,
            self.ai_group_id,
            self.ai_business_impact
                .as_deref()
                .and_then(BusinessImpact::parse),
        ) {
            (Some(recommendations), Some(priority_score), Some(group_id), Some(business_impact)) => {
                Some(Enrichment {
                    recommendations,
                    priority_score,
                    group_id,
                    business_impact,
                })
            }
            _ => None,
        };

        Finding {
            id: self.id,
            project_id: self.project_id,
            scan_id: self.scan_id,
            tool: self.tool,
            severity: Severity::parse(&self.severity).unwrap_or(Severity::Medium),
            title: self.title,
            description: self.description,
            location: self.location,
            line_number: self.line_number,
            confidence: self.confidence,
            status: FindingStatus::parse(&self.status).unwrap_or(FindingStatus::Open),
            enrichment,
            created_at: self.created_at,
        }
    }
}
