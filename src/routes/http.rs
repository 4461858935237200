// Handlers: collect, api/charts, version; plus the /collect rate-limit middleware.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    Json,
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, warn};

use super::AppState;
use crate::models::Report;
use crate::reporting::charts::CHARTS_JSON_FILE;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /collect: stores one report with the receive time.
pub(super) async fn collect_handler(
    State(state): State<AppState>,
    Json(report): Json<Report>,
) -> Response {
    match state.repo.save_report(&report, Utc::now()).await {
        Ok(()) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(e) => {
            warn!(error = %e, id = %report.id, "failed to store report");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /api/charts: the last exported chart data.
pub(super) async fn charts_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(key) = state.config.server.api_key.as_deref()
        && !authorized(key, &headers, &params)
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let path = PathBuf::from(&state.config.charts.output_dir).join(CHARTS_JSON_FILE);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "failed to read chart data");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn authorized(key: &str, headers: &HeaderMap, params: &HashMap<String, String>) -> bool {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer == Some(key) || params.get("api_key").map(String::as_str) == Some(key)
}

/// Client address: X-Real-IP, then the first X-Forwarded-For entry, then the peer.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    if let Some(ip) = header_value("x-real-ip") {
        return ip.to_string();
    }
    if let Some(ip) = header_value("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return ip.to_string();
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into())
}

pub(super) async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(req.headers(), peer);
    if !state.rate_limiter.check(&key) {
        debug!(client = %key, "collect rate limited");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    next.run(req).await
}
