//! Landing points for the admin panel's opaque URL.
//!
//! The panel itself is rendered elsewhere; these only describe where its
//! API lives. Knowing the path grants nothing: the admin API still
//! requires the admin key.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::router::CmsState;

pub async fn login(State(state): State<CmsState>) -> Json<Value> {
    Json(json!({
        "page": "admin-login",
        "dashboard": format!("/{}/dashboard", state.admin_path),
    }))
}

pub async fn dashboard() -> Json<Value> {
    Json(json!({
        "page": "admin-dashboard",
        "api": "/api/admin",
    }))
}
