//! Extractors whose rejections are rendered as the standard JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::CmsError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CmsError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CmsError))]
pub struct ApiPath<T>(pub T);
