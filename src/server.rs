// HTTP surface: health check plus the secret-gated import endpoint
use crate::error::ProxyError;
use crate::import::{ImportReport, Importer};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub importer: Arc<Importer>,
    pub proxy_secret: String,
    pub proxy_ip: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/import", post(import_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

pub async fn health_handler() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        service: "lettings-proxy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportRequest {
    pub agent_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub properties: Vec<crate::listing::NormalizedListing>,
    pub total: usize,
    pub total_found: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<usize>,
    pub proxy_ip: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

// The gate runs before any upstream work; a bad secret never costs a token.
fn authorize(headers: &HeaderMap, secret: &str) -> Result<(), ProxyError> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == secret => Ok(()),
        _ => Err(ProxyError::Unauthorized),
    }
}

fn import_response(report: ImportReport, proxy_ip: &str) -> ImportResponse {
    ImportResponse {
        success: true,
        total: report.properties.len(),
        total_found: report.total_found,
        skipped: report.skipped,
        errors: (report.errors > 0).then_some(report.errors),
        properties: report.properties,
        proxy_ip: proxy_ip.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    }
}

pub async fn import_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<ImportRequest>>,
) -> Response {
    if let Err(err) = authorize(&headers, &state.proxy_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                success: false,
                error: err.to_string(),
            }),
        )
            .into_response();
    }

    let agent_email = body.and_then(|Json(request)| request.agent_email);

    match state.importer.run(agent_email.as_deref()).await {
        Ok(report) => {
            tracing::info!(
                total = report.properties.len(),
                total_found = report.total_found,
                skipped = report.skipped,
                errors = report.errors,
                "import finished"
            );
            (
                StatusCode::OK,
                Json(import_response(report, &state.proxy_ip)),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "import failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    success: false,
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}
