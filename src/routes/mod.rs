// HTTP routes: report ingestion, chart data, version

mod http;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;
use crate::report_repo::ReportRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo: Arc<ReportRepo>,
    pub(crate) rate_limiter: Arc<RateLimiter>,
    pub(crate) config: AppConfig,
}

pub fn app(repo: Arc<ReportRepo>, config: AppConfig) -> anyhow::Result<Router> {
    let rate_limiter = Arc::new(RateLimiter::new(Duration::from_secs(
        config.server.rate_limit_window_secs,
    ))?);
    let state = AppState {
        repo,
        rate_limiter,
        config,
    };

    let collect = Router::new()
        .route("/collect", post(http::collect_handler)) // POST /collect
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            http::rate_limit,
        ));

    Ok(Router::new()
        .merge(collect)
        .route("/api/charts", get(http::charts_handler)) // GET /api/charts
        .route("/version", get(http::version_handler)) // GET /version
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state))
}
