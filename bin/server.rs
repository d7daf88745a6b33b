// Content Guard - Web Server
// REST API over the analyzer, the decision ledger and the batch runner

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use content_guard::{
    analyzer_from_config, dashboard, logging, read_table, table_to_csv_string, BatchRunner,
    Config, ContentAnalyzer, Dashboard, Decision, DecisionLedger, LedgerEntry, Priority,
    SchemaError, Verdict,
};

const ENV_ADDR: &str = "CONTENT_GUARD_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Shared application state
#[derive(Clone)]
struct AppState {
    analyzer: Arc<ContentAnalyzer>,
    /// Clones share the ledger's write lock
    ledger: DecisionLedger,
    config: Arc<Config>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn api_error(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

/// What the reviewer saw plus what they decided
#[derive(Deserialize)]
struct DecisionRequest {
    text: String,
    #[serde(default)]
    flags: Vec<String>,
    priority: Priority,
    decision: Decision,
}

#[derive(Deserialize)]
struct AnalyticsQuery {
    recent: Option<usize>,
}

#[derive(Deserialize)]
struct BatchQuery {
    column: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// POST /api/analyze - Analyze one text
async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> Response {
    if req.text.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "Enter text first.".to_string());
    }

    let verdict: Verdict = state.analyzer.analyze(&req.text);
    ApiResponse::ok(verdict)
}

/// POST /api/decisions - Record a moderator decision
async fn record_decision(
    State(state): State<AppState>,
    Json(req): Json<DecisionRequest>,
) -> Response {
    let ledger = state.ledger.clone();
    let result = tokio::task::spawn_blocking(move || {
        ledger.append(&req.text, &req.flags, req.priority, req.decision)
    })
    .await;

    match result {
        Ok(Ok(entry)) => ApiResponse::<LedgerEntry>::ok(entry),
        Ok(Err(e)) => {
            error!("Error recording decision: {:#}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET /api/analytics - Decision summary plus recent activity
async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Response {
    let ledger = state.ledger.clone();
    let limit = query.recent.unwrap_or(state.config.recent_limit);
    let result = tokio::task::spawn_blocking(move || dashboard(&ledger, limit)).await;

    match result {
        Ok(Ok(dash)) => ApiResponse::<Dashboard>::ok(dash),
        Ok(Err(e)) => {
            error!("Error reading ledger: {:#}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// POST /api/batch - CSV body in, processed CSV out
async fn run_batch(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    body: String,
) -> Response {
    let column = query
        .column
        .unwrap_or_else(|| state.config.text_column.clone());
    let analyzer = state.analyzer.clone();

    let result = tokio::task::spawn_blocking(move || -> Result<String> {
        let table = read_table(body.as_bytes())?;
        let merged = BatchRunner::new(analyzer.as_ref()).run(&table, &column)?;
        table_to_csv_string(&merged)
    })
    .await;

    match result {
        Ok(Ok(csv)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"batch_report_processed.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Ok(Err(e)) if e.downcast_ref::<SchemaError>().is_some() => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Ok(Err(e)) => api_error(StatusCode::BAD_REQUEST, format!("Error processing file: {:#}", e)),
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

// ============================================================================
// Main Server
// ============================================================================

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .route("/decisions", post(record_decision))
        .route("/analytics", get(get_analytics))
        .route("/batch", post(run_batch))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logger(1)?;

    println!("🌐 Content Guard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env();
    let analyzer = analyzer_from_config(&config)?;
    println!("✓ Pattern catalog loaded: {} rules", analyzer.catalog().rule_count());
    println!("✓ Ledger: {:?}", config.ledger_path);

    let state = AppState {
        analyzer: Arc::new(analyzer),
        ledger: DecisionLedger::new(&config.ledger_path),
        config: Arc::new(config),
    };

    let app = build_router(state);

    let addr = std::env::var(ENV_ADDR).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "Server listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/analyze", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server stopped with an error")?;

    Ok(())
}
