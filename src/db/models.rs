use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::editor::Orderable;
use crate::types::{
    Content, CredentialPatch, FaqItemPatch, GalleryPhotoPatch, NewCredential, NewFaqItem,
    NewGalleryPhoto, NewService, NewSpecialty, NewTestimonial, ServicePatch, SpecialtyPatch,
    TestimonialPatch,
};

/// Presentation layers show this when a gallery image fails to load.
pub const PLACEHOLDER_IMAGE: &str = "/uploads/placeholder.svg";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub service: String,
    pub testimonial: String,
    pub rating: i64,
    pub photo: Option<String>,
    pub is_active: bool,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FaqItem {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub is_active: bool,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub duration: Option<String>,
    pub price: Option<String>,
    pub is_active: bool,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPhoto {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub is_active: bool,
    pub order: i64,
}

impl GalleryPhoto {
    /// The image to render, or the placeholder when none is set.
    pub fn display_url(&self) -> &str {
        if self.image_url.trim().is_empty() {
            PLACEHOLDER_IMAGE
        } else {
            &self.image_url
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: i64,
    pub title: String,
    pub institution: String,
    pub year: Option<String>,
    pub is_active: bool,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub id: i64,
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

macro_rules! sortable {
    ($row:ident, $new:ident, $patch:ident, $entity:literal, $collection:literal) => {
        impl Orderable for $row {
            fn id(&self) -> i64 {
                self.id
            }
            fn order(&self) -> i64 {
                self.order
            }
            fn set_order(&mut self, order: i64) {
                self.order = order;
            }
            fn is_active(&self) -> bool {
                self.is_active
            }
            fn set_active(&mut self, active: bool) {
                self.is_active = active;
            }
        }

        impl Content for $row {
            type New = $new;
            type Patch = $patch;
            const ENTITY: &'static str = $entity;
            const COLLECTION: &'static str = $collection;

            fn activation_patch(active: bool) -> $patch {
                $patch {
                    is_active: Some(active),
                    ..Default::default()
                }
            }
        }
    };
}

sortable!(Testimonial, NewTestimonial, TestimonialPatch, "testimonial", "testimonials");
sortable!(FaqItem, NewFaqItem, FaqItemPatch, "faq item", "faq");
sortable!(Service, NewService, ServicePatch, "service", "services");
sortable!(Specialty, NewSpecialty, SpecialtyPatch, "specialty", "specialties");
sortable!(GalleryPhoto, NewGalleryPhoto, GalleryPhotoPatch, "gallery photo", "gallery");
sortable!(Credential, NewCredential, CredentialPatch, "credential", "credentials");
