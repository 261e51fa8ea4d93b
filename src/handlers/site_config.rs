use axum::{Json, extract::State};
use serde_json::Value;
use tracing::info;

use crate::db::SiteConfig;
use crate::error::CmsError;
use crate::extract::{ApiJson, ApiPath};
use crate::router::CmsState;
use crate::types::DeleteResponse;
use crate::validation::{not_blank, single};

pub async fn public_list(State(state): State<CmsState>) -> Result<Json<Vec<SiteConfig>>, CmsError> {
    Ok(Json(state.storage.get_all_site_configs().await?))
}

pub async fn public_get(
    State(state): State<CmsState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<SiteConfig>, CmsError> {
    state
        .storage
        .get_site_config(&key)
        .await?
        .map(Json)
        .ok_or(CmsError::ConfigKeyNotFound(key))
}

pub async fn admin_list(State(state): State<CmsState>) -> Result<Json<Vec<SiteConfig>>, CmsError> {
    Ok(Json(state.storage.get_all_site_configs().await?))
}

/// PUT /api/admin/site-config/{key} -> upsert; the body is the JSON value.
pub async fn set(
    State(state): State<CmsState>,
    ApiPath(key): ApiPath<String>,
    ApiJson(value): ApiJson<Value>,
) -> Result<Json<SiteConfig>, CmsError> {
    not_blank(&key).map_err(|e| CmsError::Validation(single("key", e)))?;

    let saved = state.storage.set_site_config(key.trim(), &value).await?;
    info!(key = %saved.key, "site config saved");
    Ok(Json(saved))
}

pub async fn delete(
    State(state): State<CmsState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<DeleteResponse>, CmsError> {
    let deleted = state.storage.delete_site_config(&key).await?;
    info!(key = %key, deleted, "site config delete requested");
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}
