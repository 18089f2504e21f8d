//! # error
//!
//! Centralised error types.
//!
//! [`EngineError`] is what the simulator itself can fail with; every failure is
//! local and leaves engine state untouched.  [`AppError`] is what handlers
//! return; Axum's `IntoResponse` impl converts it into a structured JSON error
//! body so the dashboard always gets a machine-readable response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// ─── EngineError ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A setup or override referenced a symbol with no quote.
    #[error("No market data available for {0}")]
    SymbolNotFound(String),

    /// Manual price overrides must stay strictly positive.
    #[error("Invalid price {price} for {symbol}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("Unknown volatility level '{0}'. Use 'low', 'medium' or 'high'")]
    UnknownVolatility(String),

    #[error("Unknown timeframe '{0}'. Use 'all', 'month' or 'week'")]
    UnknownTimeframe(String),
}

// ─── AppError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AppError {
    /// The request payload was syntactically correct but semantically invalid.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The requested resource (e.g. a quote) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::SymbolNotFound(_) => AppError::NotFound(err.to_string()),
            EngineError::InvalidPrice { .. }
            | EngineError::UnknownVolatility(_)
            | EngineError::UnknownTimeframe(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let err: AppError = EngineError::SymbolNotFound("UNKNOWN".into()).into();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "No market data available for UNKNOWN"));

        let err: AppError = EngineError::UnknownVolatility("wild".into()).into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadRequest("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
    }
}
