//! Engine errors as HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use deeds_engine::EngineError;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub EngineError);

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ApiError(EngineError::InvalidInput(msg.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::InsufficientMembers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::InvalidState(_) => StatusCode::CONFLICT,
            EngineError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            EngineError::Store(e) => {
                error!(error = %e, "Storage failure");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            code: self.0.code().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
