use axum::extract::{FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// `Json` whose rejection answers in the uniform error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query-string counterpart of [`ApiJson`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path ids arrive as raw strings so a malformed one gets a 400 in the usual shape.
pub fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid id".into()))
}
