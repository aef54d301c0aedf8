//! Report routes
//!
//! Renders enriched findings into markdown, HTML, or JSON. Findings are
//! passed through the priority aggregator before rendering, so reports list
//! the most urgent issues first.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use triage_core::report::{generate_report, ReportFormat};
use triage_core::priority;

use crate::routes::ApiError;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
    pub scan_id: Option<String>,
}

#[derive(Serialize)]
pub struct ReportResponse {
    #[serde(rename = "projectId")]
    pub project_id: Uuid,
    pub format: String,
    pub content: String,
}

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    let format = ReportFormat::parse(query.format.as_deref().unwrap_or(""));

    let (_, content) = render(&state, project_id, query.scan_id.as_deref(), format).await?;

    Ok(Json(ReportResponse {
        project_id,
        format: format.name().to_string(),
        content,
    }))
}

pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = ReportFormat::parse(query.format.as_deref().unwrap_or(""));

    let (project_name, content) =
        render(&state, project_id, query.scan_id.as_deref(), format).await?;

    let filename = format!("{}_security_report.{}", project_name, format.extension());

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(content))
        .unwrap())
}

async fn render(
    state: &AppState,
    project_id: Uuid,
    scan_id: Option<&str>,
    format: ReportFormat,
) -> Result<(String, String), ApiError> {
    let project = state
        .store
        .get_project(project_id)
        .await?
        .ok_or(ApiError::NotFound("Project not found"))?;

    let mut findings = state.store.findings_for_project(project_id, scan_id).await?;
    priority::rank(&mut findings);

    let content = generate_report(&project, &findings, format)?;

    info!(
        project = %project_id,
        findings = findings.len(),
        format = format.name(),
        "report generated"
    );

    Ok((project.name, content))
}
