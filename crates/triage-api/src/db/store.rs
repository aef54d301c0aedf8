//! Persistence gateway
//!
//! The `Store` is the sole mutator of project/scan/finding state. It is
//! constructed once at startup around the connection pool and handed to
//! routes and workers; nothing else talks to the database.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use triage_core::{
    BusinessImpact, Finding, FindingStatus, NormalizedFinding, Project, Scan, ScanStatus,
};

use super::schema::{FindingRow, ProjectRow, ProjectSummaryRow, ScanRow};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Scan {0} already exists")]
    DuplicateScan(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Service-wide dashboard counters
#[derive(Debug, Clone, Copy)]
pub struct DashboardStats {
    pub projects: i64,
    pub scans: i64,
    pub critical_issues: i64,
    pub high_issues: i64,
}

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

const FINDING_COLUMNS: &str = "id, project_id, scan_id, tool, severity, title, description, \
     location, line_number, confidence, status, ai_recommendations, ai_priority_score, \
     ai_group_id, ai_business_impact, created_at";

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a project by repository, creating it if unseen. The conflict
    /// clause makes this race-safe: two concurrent first-time ingestions for
    /// the same repository resolve to one row.
    pub async fn upsert_project(&self, github_repo: &str, name: &str) -> StoreResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO projects (id, name, github_repo) VALUES ($1, $2, $3) \
             ON CONFLICT (github_repo) DO UPDATE SET github_repo = EXCLUDED.github_repo \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(github_repo)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Insert a scan in `processing` state. A duplicate id maps to
    /// `StoreError::DuplicateScan` so the caller can regenerate and retry.
    pub async fn create_scan(
        &self,
        scan_id: &str,
        project_id: Uuid,
        tool: &str,
        total_findings: i32,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO scans (id, project_id, tool, status, started_at, total_findings) \
             VALUES ($1, $2, $3, $4, NOW(), $5)",
        )
        .bind(scan_id)
        .bind(project_id)
        .bind(tool)
        .bind(ScanStatus::Processing.as_str())
        .bind(total_findings)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateScan(scan_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert the whole batch inside one transaction: callers observe either
    /// all findings for a webhook or none.
    pub async fn insert_findings(
        &self,
        scan_id: &str,
        project_id: Uuid,
        tool: &str,
        findings: &[NormalizedFinding],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for finding in findings {
            sqlx::query(
                "INSERT INTO findings (id, project_id, scan_id, tool, severity, title, \
                 description, location, line_number, confidence, status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(scan_id)
            .bind(tool)
            .bind(finding.severity.as_str())
            .bind(&finding.title)
            .bind(&finding.description)
            .bind(&finding.location)
            .bind(finding.line_number)
            .bind(finding.confidence)
            .bind(FindingStatus::Open.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Mark a scan completed. Severity counters are recomputed from the
    /// persisted findings, never incremented, so they cannot drift.
    pub async fn complete_scan(&self, scan_id: &str) -> StoreResult<()> {
        sqlx::query(
            "UPDATE scans \
             SET status = $2, completed_at = NOW(), \
                 high_severity = (SELECT COUNT(*) FROM findings WHERE scan_id = $1 AND severity = 'high'), \
                 medium_severity = (SELECT COUNT(*) FROM findings WHERE scan_id = $1 AND severity = 'medium'), \
                 low_severity = (SELECT COUNT(*) FROM findings WHERE scan_id = $1 AND severity = 'low'), \
                 info_severity = (SELECT COUNT(*) FROM findings WHERE scan_id = $1 AND severity = 'info') \
             WHERE id = $1",
        )
        .bind(scan_id)
        .bind(ScanStatus::Completed.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write all enrichment columns for one finding in a single statement.
    /// Retryable: the same inputs leave the row unchanged.
    pub async fn apply_enrichment(
        &self,
        finding_id: Uuid,
        recommendations: &[String],
        priority_score: i32,
        group_id: &str,
        business_impact: BusinessImpact,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE findings \
             SET ai_recommendations = $2, ai_priority_score = $3, ai_group_id = $4, \
                 ai_business_impact = $5 \
             WHERE id = $1",
        )
        .bind(finding_id)
        .bind(recommendations.to_vec())
        .bind(priority_score)
        .bind(group_id)
        .bind(business_impact.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, github_repo, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProjectRow::into_project))
    }

    pub async fn list_projects(&self) -> StoreResult<Vec<ProjectSummaryRow>> {
        let rows = sqlx::query_as::<_, ProjectSummaryRow>(
            "SELECT p.id, p.name, p.github_repo, p.created_at, \
                    s.total_findings, s.high_severity, s.medium_severity \
             FROM projects p \
             LEFT JOIN ( \
                 SELECT project_id, COUNT(*) AS total_findings, \
                        COUNT(*) FILTER (WHERE severity = 'high') AS high_severity, \
                        COUNT(*) FILTER (WHERE severity = 'medium') AS medium_severity \
                 FROM findings \
                 GROUP BY project_id \
             ) s ON p.id = s.project_id \
             ORDER BY p.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn scans_for_project(&self, project_id: Uuid) -> StoreResult<Vec<Scan>> {
        let rows = sqlx::query_as::<_, ScanRow>(
            "SELECT id, project_id, tool, status, started_at, completed_at, total_findings, \
                    high_severity, medium_severity, low_severity, info_severity \
             FROM scans WHERE project_id = $1 \
             ORDER BY started_at DESC LIMIT 50",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ScanRow::into_scan).collect())
    }

    /// All findings for one scan, in insertion order. Used by the enrichment
    /// worker, which reads committed state only.
    pub async fn findings_for_scan(&self, scan_id: &str) -> StoreResult<Vec<Finding>> {
        let rows = sqlx::query_as::<_, FindingRow>(&format!(
            "SELECT {FINDING_COLUMNS} FROM findings WHERE scan_id = $1 ORDER BY created_at"
        ))
        .bind(scan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FindingRow::into_finding).collect())
    }

    /// Findings for a project, optionally narrowed to one scan. Ordering is
    /// left to the priority aggregator.
    pub async fn findings_for_project(
        &self,
        project_id: Uuid,
        scan_id: Option<&str>,
    ) -> StoreResult<Vec<Finding>> {
        let rows = match scan_id {
            Some(scan_id) => {
                sqlx::query_as::<_, FindingRow>(&format!(
                    "SELECT {FINDING_COLUMNS} FROM findings \
                     WHERE project_id = $1 AND scan_id = $2"
                ))
                .bind(project_id)
                .bind(scan_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FindingRow>(&format!(
                    "SELECT {FINDING_COLUMNS} FROM findings WHERE project_id = $1"
                ))
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(FindingRow::into_finding).collect())
    }

    pub async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        let scans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scans")
            .fetch_one(&self.pool)
            .await?;

        let critical_issues: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM findings WHERE severity = 'critical'")
                .fetch_one(&self.pool)
                .await?;

        let high_issues: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM findings WHERE severity = 'high'")
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardStats {
            projects,
            scans,
            critical_issues,
            high_issues,
        })
    }
}
