//! Enrichment worker
//!
//! Consumes jobs from the ingestion queue, one job per committed scan. Each
//! job makes exactly one provider call for the whole batch; any failure
//! switches the batch to the deterministic fallback policy. Nothing here
//! ever reports back to the webhook caller.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use triage_core::fallback;
use triage_enrich::AnalysisClient;

use crate::db::store::Store;

/// Hand-off unit between the webhook route and this worker.
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    pub scan_id: String,
}

/// Spawn the worker loop. Jobs run on their own tasks, so scans for
/// different projects enrich in parallel.
pub fn spawn(
    store: Store,
    client: AnalysisClient,
    mut jobs: mpsc::Receiver<EnrichmentJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("enrichment worker started");

        while let Some(job) = jobs.recv().await {
            let store = store.clone();
            let client = client.clone();
            tokio::spawn(async move {
                enrich_scan(&store, &client, &job.scan_id).await;
            });
        }

        info!("enrichment worker stopped");
    })
}

async fn enrich_scan(store: &Store, client: &AnalysisClient, scan_id: &str) {
    let findings = match store.findings_for_scan(scan_id).await {
        Ok(findings) => findings,
        Err(e) => {
            error!(%scan_id, "failed to load findings for enrichment: {}", e);
            return;
        }
    };

    if findings.is_empty() {
        return;
    }

    match client.analyze_batch(&findings).await {
        Ok(verdict) => {
            info!(
                %scan_id,
                count = findings.len(),
                group = %verdict.group_id,
                score = verdict.confidence_score,
                "AI analysis completed"
            );

            // The provider judges the batch holistically; the one verdict is
            // applied to every finding in the scan.
            for finding in &findings {
                if let Err(e) = store
                    .apply_enrichment(
                        finding.id,
                        &verdict.recommendations,
                        verdict.confidence_score,
                        &verdict.group_id,
                        verdict.business_impact,
                    )
                    .await
                {
                    error!(%scan_id, finding = %finding.id, "failed to store enrichment: {}", e);
                }
            }
        }
        Err(e) => {
            warn!(%scan_id, "AI analysis failed, applying fallback policy: {}", e);

            let business_impact = fallback::business_impact(&findings);
            for finding in &findings {
                let recommendations = fallback::recommendations(finding.severity);
                if let Err(e) = store
                    .apply_enrichment(
                        finding.id,
                        &recommendations,
                        fallback::FALLBACK_CONFIDENCE,
                        fallback::AUTO_GROUP_ID,
                        business_impact,
                    )
                    .await
                {
                    error!(%scan_id, finding = %finding.id, "failed to store fallback enrichment: {}", e);
                }
            }
        }
    }
}
