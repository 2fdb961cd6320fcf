//! Errors surfaced by the prediction endpoint

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::time::Duration;
use thiserror::Error;

use crate::models::ApiResponse;

pub type Result<T> = std::result::Result<T, PredictionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// The caller sent something we cannot extrapolate from
    #[error("validation error: {0}")]
    Validation(String),

    /// Randomly injected failure, independent of the input
    #[error("simulated failure: prediction failed")]
    SimulatedFailure,
}

impl PredictionError {
    pub fn validation(message: impl Into<String>) -> Self {
        PredictionError::Validation(message.into())
    }

    /// Error envelope, with the handler's elapsed time when it is known.
    pub fn to_response(&self, elapsed: Option<Duration>) -> HttpResponse {
        let mut response = ApiResponse::<()>::error(&self.to_string());
        response.execution_time_ms = elapsed.map(|d| d.as_millis() as u64);
        HttpResponse::build(self.status_code()).json(response)
    }
}

impl ResponseError for PredictionError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictionError::SimulatedFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_a_client_error() {
        let err = PredictionError::validation("missing field `n_pred`");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "validation error: missing field `n_pred`");
    }

    #[test]
    fn simulated_failure_is_a_server_error() {
        let err = PredictionError::SimulatedFailure;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("simulated failure"));
    }
}
