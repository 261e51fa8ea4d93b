use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::editor::OrderEntry;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimonial {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub name: String,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub service: String,
    #[validate(length(min = 10, message = "must be at least 10 characters"))]
    pub testimonial: String,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i64,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::optional_image_location"))]
    pub photo: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, message = "must be at least 10 characters"))]
    pub testimonial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<i64>,
    /// An empty string clears the photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::optional_image_location"))]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewFaqItem {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub question: String,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub answer: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FaqItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: String,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSpecialty {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: String,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewGalleryPhoto {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom(function = "crate::validation::image_location"))]
    pub image_url: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhotoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::image_location"))]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

/// `year` is free text ("2018", "2015-2019", "Em andamento").
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: String,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub institution: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order: Option<i64>,
}

/// Body of `POST /api/admin/{collection}/reorder`.
///
/// Either a bare `[{"id":..,"order":..}]` array or an object keyed by
/// `items`. The testimonial panel historically posted `{"testimonials": [...]}`;
/// that key is accepted for every collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReorderRequest {
    Entries(Vec<OrderEntry>),
    Keyed {
        #[serde(alias = "testimonials")]
        items: Vec<OrderEntry>,
    },
}

impl ReorderRequest {
    pub fn entries(&self) -> &[OrderEntry] {
        match self {
            ReorderRequest::Entries(items) | ReorderRequest::Keyed { items } => items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderResponse {
    pub success: bool,
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}
