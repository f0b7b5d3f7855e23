//! Request extractors whose rejections are reported as [`AppError`], so a
//! malformed body, path or query string gets the same `{"error": ...}`
//! body as every other failure.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
