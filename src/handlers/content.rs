use axum::{Json, extract::State, http::StatusCode};
use tracing::info;
use validator::Validate;

use crate::db::ContentTable;
use crate::editor::Orderable;
use crate::error::CmsError;
use crate::extract::{ApiJson, ApiPath};
use crate::router::CmsState;
use crate::types::{DeleteResponse, ReorderRequest, ReorderResponse};

/// GET /api/{collection} -> visible rows in display order.
pub async fn public_list<T: ContentTable>(
    State(state): State<CmsState>,
) -> Result<Json<Vec<T>>, CmsError> {
    Ok(Json(state.storage.list_active::<T>().await?))
}

/// GET /api/admin/{collection} -> every row, hidden ones included.
pub async fn admin_list<T: ContentTable>(
    State(state): State<CmsState>,
) -> Result<Json<Vec<T>>, CmsError> {
    Ok(Json(state.storage.list::<T>().await?))
}

pub async fn create<T: ContentTable>(
    State(state): State<CmsState>,
    ApiJson(new): ApiJson<T::New>,
) -> Result<(StatusCode, Json<T>), CmsError> {
    new.validate()?;
    let row = state.storage.create::<T>(&new).await?;
    info!(entity = T::ENTITY, id = row.id(), "created");
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update<T: ContentTable>(
    State(state): State<CmsState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<T::Patch>,
) -> Result<Json<T>, CmsError> {
    patch.validate()?;
    let row = state.storage.update::<T>(id, &patch).await?;
    info!(entity = T::ENTITY, id, "updated");
    Ok(Json(row))
}

pub async fn delete<T: ContentTable>(
    State(state): State<CmsState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DeleteResponse>, CmsError> {
    let existing = state.storage.get::<T>(id).await?;
    let deleted = state.storage.delete::<T>(id).await?;
    if deleted && let Some(image) = existing.as_ref().and_then(|row| row.stored_image()) {
        state.images.remove(image).await;
    }
    info!(entity = T::ENTITY, id, deleted, "delete requested");
    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

pub async fn reorder<T: ContentTable>(
    State(state): State<CmsState>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> Result<Json<ReorderResponse>, CmsError> {
    let entries = req.entries();
    let updated = state.storage.reorder::<T>(entries).await?;
    info!(
        entity = T::ENTITY,
        count = entries.len(),
        updated,
        "order saved"
    );
    Ok(Json(ReorderResponse {
        success: true,
        updated,
    }))
}
