//! Webhook ingestion route
//!
//! One endpoint per scanning tool (`/api/webhooks/:tool`). Normalization and
//! persistence are synchronous within the request; the response is sent once
//! findings are durably stored. Enrichment is handed to the worker queue and
//! never awaited here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use triage_core::normalize_payload;

use crate::db::store::StoreError;
use crate::routes::ApiError;
use crate::workers::EnrichmentJob;
use crate::AppState;

/// Repository identifier used when the payload names none.
pub const DEFAULT_REPO: &str = "default";

const DEFAULT_PROJECT_NAME: &str = "Unnamed Project";

#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(rename = "scanId")]
    pub scan_id: String,
    #[serde(rename = "findingsCount")]
    pub findings_count: usize,
}

pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Path(tool): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let findings = normalize_payload(&payload)?;

    let scan_id = payload
        .get("scan_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generated_scan_id);

    info!(%tool, %scan_id, count = findings.len(), "received webhook");

    let github_repo = payload
        .get("github_repo")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REPO);
    let project_name = payload
        .get("project_name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_PROJECT_NAME);

    let project_id = state.store.upsert_project(github_repo, project_name).await?;

    let scan_id = match state
        .store
        .create_scan(&scan_id, project_id, &tool, findings.len() as i32)
        .await
    {
        Ok(()) => scan_id,
        Err(StoreError::DuplicateScan(existing)) => {
            let fresh = fresh_scan_id();
            warn!(%existing, %fresh, "scan id taken, retrying with a fresh one");
            state
                .store
                .create_scan(&fresh, project_id, &tool, findings.len() as i32)
                .await?;
            fresh
        }
        Err(e) => return Err(e.into()),
    };

    state
        .store
        .insert_findings(&scan_id, project_id, &tool, &findings)
        .await?;
    state.store.complete_scan(&scan_id).await?;

    // Ingestion is acknowledged regardless of whether the job fits in the
    // queue; a dropped job only means the batch stays unenriched.
    if !findings.is_empty()
        && state
            .enrich_tx
            .try_send(EnrichmentJob {
                scan_id: scan_id.clone(),
            })
            .is_err()
    {
        warn!(%scan_id, "enrichment queue full, batch will not be enriched");
    }

    info!(%tool, %scan_id, count = findings.len(), "ingestion complete");

    Ok(Json(WebhookResponse {
        success: true,
        scan_id,
        findings_count: findings.len(),
    }))
}

fn generated_scan_id() -> String {
    format!("scan-{}", Utc::now().timestamp_millis())
}

fn fresh_scan_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("scan-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_scan_ids_carry_the_prefix() {
        assert!(generated_scan_id().starts_with("scan-"));
        assert!(fresh_scan_id().starts_with("scan-"));
    }

    #[test]
    fn fresh_scan_ids_are_distinct() {
        assert_ne!(fresh_scan_id(), fresh_scan_id());
    }
}
