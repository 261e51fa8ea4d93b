use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError, multipart::MultipartRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::info;

use crate::db::Testimonial;
use crate::error::CmsError;
use crate::extract::ApiPath;
use crate::router::CmsState;
use crate::types::{Content, ImageUploadResponse};

const IMAGE_FIELD: &str = "image";

/// POST /api/admin/testimonials/{id}/image -> store the multipart `image`
/// field and make it the testimonial photo.
pub async fn upload(
    State(state): State<CmsState>,
    ApiPath(id): ApiPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageUploadResponse>, CmsError> {
    let mut multipart = multipart?;
    let existing = state
        .storage
        .get::<Testimonial>(id)
        .await?
        .ok_or_else(|| CmsError::not_found(Testimonial::ENTITY, id))?;

    let mut stored = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(CmsError::Upload("file must be an image".to_string()));
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let url = state
            .images
            .save("testimonials", &format!("testimonial-{id}"), &content_type, &bytes)
            .await?;
        stored = Some(url);
        break;
    }
    let url = stored.ok_or_else(|| CmsError::Upload(format!("missing `{IMAGE_FIELD}` field")))?;

    if let Err(e) = state.storage.set_testimonial_photo(id, Some(&url)).await {
        state.images.remove(&url).await;
        return Err(e);
    }
    if let Some(old) = existing.photo.as_deref()
        && old != url
    {
        state.images.remove(old).await;
    }

    info!(id, url = %url, "testimonial photo replaced");
    Ok(Json(ImageUploadResponse { image_url: url }))
}

/// DELETE /api/admin/testimonials/{id}/image -> clear the photo and drop the file.
pub async fn remove(
    State(state): State<CmsState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>, CmsError> {
    let existing = state
        .storage
        .get::<Testimonial>(id)
        .await?
        .ok_or_else(|| CmsError::not_found(Testimonial::ENTITY, id))?;

    state.storage.set_testimonial_photo(id, None).await?;
    if let Some(old) = existing.photo.as_deref() {
        state.images.remove(old).await;
    }

    info!(id, "testimonial photo removed");
    Ok(Json(json!({ "success": true })))
}

fn multipart_error(e: MultipartError) -> CmsError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CmsError::PayloadTooLarge
    } else {
        CmsError::Upload(e.body_text())
    }
}
