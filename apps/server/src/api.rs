use std::sync::Arc;

use axum::{http::StatusCode, routing::get, routing::post, Json, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{TickerInfo, TickerRequest},
};

pub mod quotes;

#[utoipa::path(get, path = "/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Quote store reachable"),
        (status = 503, description = "Quote store unreachable")
    )
)]
pub async fn readyz(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> ApiResult<&'static str> {
    state
        .quote_service
        .ping()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    Ok("ok")
}

#[derive(OpenApi)]
#[openapi(
    paths(healthz, readyz, quotes::get_ticker, quotes::get_tickers),
    components(schemas(TickerInfo, TickerRequest)),
    tags((name = "tickerwatch"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/ticker", get(quotes::get_ticker))
        .route("/tickers", post(quotes::get_tickers))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}
