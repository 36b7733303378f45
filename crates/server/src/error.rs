use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::error::ServiceError;
use log::error;
use models::assignment::Clash;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// The teachers and slots a rejected edit would double-book
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub clashes: Option<Vec<Clash>>,
}

/// A [`ServiceError`] on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match self.0 {
            ServiceError::Conflict { message, clashes } => ErrorResponse {
                message,
                clashes: (!clashes.is_empty()).then_some(clashes),
            },
            ServiceError::Database(err) => {
                error!("Database error: {err}");
                ErrorResponse {
                    message: "internal server error".to_string(),
                    clashes: None,
                }
            }
            other => ErrorResponse {
                message: other.to_string(),
                clashes: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
