use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_extractor_with_state,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::db::{
    ContentStorage, ContentTable, Credential, FaqItem, GalleryPhoto, Service, Specialty,
    Testimonial,
};
use crate::handlers::{content, gate, images, site_config};
use crate::middleware::auth::RequireAdminKey;
use crate::uploads::{ImageStore, PUBLIC_PREFIX};

#[derive(Clone)]
pub struct CmsState {
    pub storage: ContentStorage,
    pub images: ImageStore,
    pub admin_key: Arc<str>,
    pub admin_path: Arc<str>,
}

impl CmsState {
    pub fn new(
        storage: ContentStorage,
        images: ImageStore,
        admin_key: impl Into<Arc<str>>,
        admin_path: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            storage,
            images,
            admin_key: admin_key.into(),
            admin_path: admin_path.into(),
        }
    }
}

/// Multipart framing on top of the raw image bytes.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn cms_router(state: CmsState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/site-config", get(site_config::public_list))
        .route("/api/site-config/{key}", get(site_config::public_get));
    let public = public_collection::<Testimonial>(public);
    let public = public_collection::<FaqItem>(public);
    let public = public_collection::<Service>(public);
    let public = public_collection::<Specialty>(public);
    let public = public_collection::<GalleryPhoto>(public);
    let public = public_collection::<Credential>(public);

    let image_limit = state.images.max_bytes() + MULTIPART_OVERHEAD;
    let admin = Router::new()
        .route("/api/admin/site-config", get(site_config::admin_list))
        .route(
            "/api/admin/site-config/{key}",
            put(site_config::set).delete(site_config::delete),
        )
        .route(
            "/api/admin/testimonials/{id}/image",
            post(images::upload)
                .delete(images::remove)
                .layer(DefaultBodyLimit::max(image_limit)),
        );
    let admin = admin_collection::<Testimonial>(admin);
    let admin = admin_collection::<FaqItem>(admin);
    let admin = admin_collection::<Service>(admin);
    let admin = admin_collection::<Specialty>(admin);
    let admin = admin_collection::<GalleryPhoto>(admin);
    let admin = admin_collection::<Credential>(admin);
    let admin = admin.route_layer(from_extractor_with_state::<RequireAdminKey, _>(
        state.clone(),
    ));

    // Published under an opaque segment; not an authentication boundary.
    let login_path = format!("/{}", state.admin_path);
    let gate = Router::new()
        .route(&login_path, get(gate::login))
        .route(&format!("{login_path}/dashboard"), get(gate::dashboard));

    Router::new()
        .merge(public)
        .merge(admin)
        .merge(gate)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.images.root()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_collection<T: ContentTable>(router: Router<CmsState>) -> Router<CmsState> {
    router.route(
        &format!("/api/{}", T::COLLECTION),
        get(content::public_list::<T>),
    )
}

fn admin_collection<T: ContentTable>(router: Router<CmsState>) -> Router<CmsState> {
    let base = format!("/api/admin/{}", T::COLLECTION);
    router
        .route(&base, get(content::admin_list::<T>).post(content::create::<T>))
        .route(&format!("{base}/reorder"), post(content::reorder::<T>))
        .route(
            &format!("{base}/{{id}}"),
            put(content::update::<T>).delete(content::delete::<T>),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
