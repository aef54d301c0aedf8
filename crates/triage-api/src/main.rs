//! Security Finding Triage API Server

mod db;
mod routes;
mod workers;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_enrich::{AnalysisClient, AnalysisConfig};

use crate::db::store::Store;
use crate::workers::EnrichmentJob;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub enrich_tx: mpsc::Sender<EnrichmentJob>,
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub cors_origin: String,
    pub body_limit: usize,
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let analysis_defaults = AnalysisConfig::default();

        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/triage".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            body_limit: 50 * 1024 * 1024, // 50MB
            analysis: AnalysisConfig {
                base_url: std::env::var("AI_BASE_URL")
                    .unwrap_or(analysis_defaults.base_url),
                api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
                model: std::env::var("AI_MODEL").unwrap_or(analysis_defaults.model),
                ..analysis_defaults
            },
        }
    }
}

/// Capacity of the ingestion -> enrichment hand-off queue.
const ENRICH_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "triage_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Finding Triage API Server");

    let config = AppConfig::default();

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    info!("Database migrations complete");

    let store = Store::new(pool);

    // Enrichment pipeline: provider client + queue-fed worker
    let client = AnalysisClient::new(config.analysis.clone())
        .expect("Failed to build analysis client");
    let (enrich_tx, enrich_rx) = mpsc::channel(ENRICH_QUEUE_CAPACITY);
    workers::enrich::spawn(store.clone(), client, enrich_rx);

    let cors = if config.cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(
                config
                    .cors_origin
                    .parse::<HeaderValue>()
                    .expect("Invalid CORS_ORIGIN"),
            )
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let addr = format!("0.0.0.0:{}", config.port);

    // Create shared state
    let state = Arc::new(AppState { store, enrich_tx });

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(routes::health_check))

        // Webhook ingestion, one path per tool
        .route("/api/webhooks/:tool", post(routes::webhooks::ingest))

        // Dashboard queries
        .route("/api/projects", get(routes::projects::list_projects))
        .route("/api/projects/:id/scans", get(routes::projects::project_scans))
        .route(
            "/api/projects/:id/scans/:scan_id/findings",
            get(routes::projects::scan_findings),
        )
        .route("/api/dashboard/stats", get(routes::projects::dashboard_stats))

        // Reports
        .route("/api/projects/:id/report", get(routes::reports::get_report))
        .route(
            "/api/projects/:id/report/download",
            get(routes::reports::download_report),
        )

        // Body limit
        .layer(DefaultBodyLimit::max(config.body_limit))

        // CORS
        .layer(cors)

        // Tracing
        .layer(TraceLayer::new_for_http())

        // State
        .with_state(state);

    // Start server
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
