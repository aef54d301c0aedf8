//! Dashboard query routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use triage_core::{priority, Finding, Scan};

use crate::routes::ApiError;
use crate::AppState;

#[derive(Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub github_repo: String,
    pub created_at: DateTime<Utc>,
    pub total_findings: i64,
    pub high_severity: i64,
    pub medium_severity: i64,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub projects: i64,
    pub scans: i64,
    #[serde(rename = "criticalIssues")]
    pub critical_issues: i64,
    #[serde(rename = "highIssues")]
    pub high_issues: i64,
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let rows = state.store.list_projects().await?;

    let projects = rows
        .into_iter()
        .map(|row| ProjectSummary {
            id: row.id,
            name: row.name,
            github_repo: row.github_repo,
            created_at: row.created_at,
            total_findings: row.total_findings.unwrap_or(0),
            high_severity: row.high_severity.unwrap_or(0),
            medium_severity: row.medium_severity.unwrap_or(0),
        })
        .collect();

    Ok(Json(projects))
}

pub async fn project_scans(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Scan>>, ApiError> {
    let scans = state.store.scans_for_project(project_id).await?;
    Ok(Json(scans))
}

/// Findings for one scan, most urgent first.
pub async fn scan_findings(
    State(state): State<Arc<AppState>>,
    Path((project_id, scan_id)): Path<(Uuid, String)>,
) -> Result<Json<Vec<Finding>>, ApiError> {
    let mut findings = state
        .store
        .findings_for_project(project_id, Some(&scan_id))
        .await?;
    priority::rank(&mut findings);
    Ok(Json(findings))
}

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store.dashboard_stats().await?;

    Ok(Json(StatsResponse {
        projects: stats.projects,
        scans: stats.scans,
        critical_issues: stats.critical_issues,
        high_issues: stats.high_issues,
    }))
}
