use crate::error::ApiError;
use axum::extract::FromRequest;

/// `axum::Json`, with malformed bodies reported as validation errors
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
