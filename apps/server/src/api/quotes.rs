use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{TickerInfo, TickerQuery, TickerRequest},
};

#[utoipa::path(
    get,
    path = "/ticker",
    params(("ticker" = String, Query, description = "Symbol to quote")),
    responses(
        (status = 200, body = TickerInfo),
        (status = 400, description = "Missing or blank ticker"),
        (status = 500, description = "Provider error")
    )
)]
pub async fn get_ticker(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TickerQuery>, QueryRejection>,
) -> ApiResult<Json<TickerInfo>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let ticker = query
        .ticker
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing ticker query parameter".to_string()))?;

    let cancel = state.shutdown.child_token();
    let quote = state.quote_service.get_quote(&ticker, &cancel).await?;
    Ok(Json(quote.into()))
}

#[utoipa::path(
    post,
    path = "/tickers",
    request_body = TickerRequest,
    responses(
        (status = 200, body = [TickerInfo]),
        (status = 400, description = "Malformed body"),
        (status = 500, description = "Provider error for any symbol")
    )
)]
pub async fn get_tickers(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TickerRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<TickerInfo>>> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let cancel = state.shutdown.child_token();
    let quotes = state
        .quote_service
        .get_quotes(&body.tickers, &cancel)
        .await?;
    Ok(Json(quotes.into_iter().map(TickerInfo::from).collect()))
}
