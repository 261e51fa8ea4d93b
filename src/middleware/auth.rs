use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::CmsError;
use crate::router::CmsState;

/// Ensure the inbound request carries the admin key.
/// Accepts either:
/// - Header: `x-admin-key: ...`
/// - Header: `Authorization: Bearer ...`
pub fn ensure_authorized(headers: &HeaderMap, expected: &str) -> Result<(), CmsError> {
    if expected.is_empty() {
        return Err(CmsError::Unauthorized);
    }

    // 1) header: x-admin-key
    if let Some(hv) = headers.get("x-admin-key").and_then(|v| v.to_str().ok())
        && key_matches(hv, expected)
    {
        return Ok(());
    }

    // 2) header: Authorization: Bearer <key>
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && key_matches(token.trim(), expected)
        {
            return Ok(());
        }
    }

    Err(CmsError::Unauthorized)
}

fn key_matches(given: &str, expected: &str) -> bool {
    bool::from(given.as_bytes().ct_eq(expected.as_bytes()))
}

#[derive(Debug, Clone, Copy)]
pub struct RequireAdminKey;

impl FromRequestParts<CmsState> for RequireAdminKey {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CmsState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(&parts.headers, &state.admin_key)
            .map_err(IntoResponse::into_response)?;
        Ok(Self)
    }
}
