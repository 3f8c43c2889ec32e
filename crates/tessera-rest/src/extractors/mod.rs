//! Custom Axum extractors.
//!
//! Wrappers around Axum's own extractors whose rejections use the standard
//! error envelope instead of a plain-text body.

use crate::responses::AppError;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

/// JSON body extractor. Malformed bodies are rejected with 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Path parameter extractor. Unparseable segments are rejected with 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);
