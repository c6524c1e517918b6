use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tickerwatch_core::errors::Error as CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error bodies are the plain message.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tickerwatch_core::errors::ValidationError;
    use tickerwatch_market_data::MarketDataError;

    #[test]
    fn test_status_mapping() {
        let validation = ApiError::from(CoreError::from(ValidationError::MissingField(
            "ticker".to_string(),
        )));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let not_found = ApiError::from(CoreError::from(MarketDataError::SymbolNotFound(
            "MSFT".to_string(),
        )));
        assert_eq!(not_found.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            ApiError::Unavailable("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
