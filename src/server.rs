//! HTTP API for the assistant.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ask` | Ask a natural-language question, get a spoken-style answer |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/stats/summary` | Dashboard headline numbers |
//!
//! # Error Contract
//!
//! Error responses use one JSON shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "No question provided" } }
//! ```
//!
//! Codes: `bad_request` (400), `internal` (500). Rate-limit rejections and
//! failed syntheses are deliberately *not* errors — they come back as normal
//! `200` envelopes with a canned answer, so chat front-ends render them as
//! messages rather than error dialogs.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support the browser
//! front-end.

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::config::Config;
use crate::models::{AskResponse, ConversationTurn};
use crate::pipeline::Pipeline;
use crate::schema;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

/// Starts the HTTP server on the configured bind address. Runs until the
/// process is terminated.
pub async fn run_server(config: &Config, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState { pipeline };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .route("/stats/summary", get(handle_stats_summary))
        .layer(cors)
        .with_state(state);

    println!("courtdesk listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Generic 500. The real error is logged server-side and never leaked.
fn internal_error() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: "The assistant hit an unexpected problem. Please try again.".to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ask ============

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

/// Main endpoint. The rate-limit identity is the peer socket address —
/// trivially rotated, acceptable for a demo workload.
async fn handle_ask(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let client_id = addr.ip().to_string();
    let question = req.question.trim();

    if question.is_empty() {
        return Err(bad_request("No question provided"));
    }

    let outcome = state
        .pipeline
        .ask(&client_id, question, &req.history)
        .await
        .map_err(|e| {
            error!(error = %e, "pipeline run failed");
            internal_error()
        })?;

    Ok(Json(state.pipeline.respond(question, outcome)))
}

// ============ GET /stats/summary ============

#[derive(Serialize)]
struct SummaryStats {
    active_members: i64,
    revenue_this_month: f64,
    bookings_today: i64,
}

/// Headline numbers for dashboard cards. Dates are relative to the schema's
/// current-date anchor, matching the seeded data.
async fn handle_stats_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryStats>, AppError> {
    let pool = state.pipeline.pool();

    let active_members: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE status = 'active'")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                error!(error = %e, "stats query failed");
                internal_error()
            })?;

    let revenue_this_month: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(price), 0) FROM bookings \
         WHERE status = 'completed' AND strftime('%Y-%m', booking_date) = strftime('%Y-%m', ?)",
    )
    .bind(schema::CURRENT_DATE_ANCHOR)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        error!(error = %e, "stats query failed");
        internal_error()
    })?;

    let bookings_today: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE booking_date = ?")
            .bind(schema::CURRENT_DATE_ANCHOR)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                error!(error = %e, "stats query failed");
                internal_error()
            })?;

    Ok(Json(SummaryStats {
        active_members,
        revenue_this_month: (revenue_this_month * 100.0).round() / 100.0,
        bookings_today,
    }))
}
