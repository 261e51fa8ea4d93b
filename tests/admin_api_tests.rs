mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{ADMIN_KEY, ADMIN_PATH, TestApp, multipart_body};
use serde_json::{Value, json};

fn testimonial(name: &str, rating: i64) -> Value {
    json!({
        "name": name,
        "service": "Terapia individual",
        "testimonial": "Encontrei acolhimento e clareza nas sessões.",
        "rating": rating,
    })
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|row| row["id"].as_i64().expect("row without id"))
        .collect()
}

fn upload_request(uri: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "practice-cms-boundary";
    let body = multipart_body(boundary, "image", "photo.png", content_type, bytes);
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-admin-key", ADMIN_KEY)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("failed to build upload request")
}

#[tokio::test]
async fn admin_routes_require_the_key() {
    let app = TestApp::new("auth").await;

    let (status, body) = app.call("GET", "/api/admin/testimonials", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = app
        .call(
            "POST",
            "/api/admin/faq",
            Some(json!({ "question": "Q?", "answer": "A." })),
            Some("wrong-key"),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call("PUT", "/api/admin/site-config/hero", Some(json!("x")), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/admin/testimonials")
        .header("authorization", format!("Bearer {ADMIN_KEY}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn invalid_rating_is_rejected_before_storage() {
    let app = TestApp::new("rating").await;

    let (status, body) = app
        .admin("POST", "/api/admin/testimonials", Some(testimonial("Ana", 6)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields = body["error"]["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["field"] == "rating"));

    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn testimonial_crud_round_trip() {
    let app = TestApp::new("crud").await;

    let (status, created) = app
        .admin("POST", "/api/admin/testimonials", Some(testimonial("Ana", 5)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["order"], 0);
    assert_eq!(created["isActive"], true);
    assert_eq!(created["photo"], Value::Null);

    let (status, updated) = app
        .admin(
            "PUT",
            &format!("/api/admin/testimonials/{id}"),
            Some(json!({ "rating": 4, "service": "Terapia de casal" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["rating"], 4);
    assert_eq!(updated["service"], "Terapia de casal");
    assert_eq!(updated["name"], "Ana");

    let (status, body) = app
        .admin(
            "PUT",
            "/api/admin/testimonials/9999",
            Some(json!({ "rating": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = app
        .admin("DELETE", &format!("/api/admin/testimonials/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "deleted": true }));

    let (status, body) = app
        .admin("DELETE", &format!("/api/admin/testimonials/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "deleted": false }));
}

#[tokio::test]
async fn reorder_accepts_every_body_shape() {
    let app = TestApp::new("reorder").await;

    let mut created = Vec::new();
    for name in ["Ana", "Bruno", "Carla"] {
        let (_, row) = app
            .admin("POST", "/api/admin/testimonials", Some(testimonial(name, 5)))
            .await;
        created.push(row["id"].as_i64().unwrap());
    }
    let (a, b, c) = (created[0], created[1], created[2]);

    let (status, body) = app
        .admin(
            "POST",
            "/api/admin/testimonials/reorder",
            Some(json!({ "testimonials": [
                { "id": c, "order": 0 },
                { "id": a, "order": 1 },
                { "id": b, "order": 2 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "updated": 3 }));

    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(ids(&list), vec![c, a, b]);

    let (status, _) = app
        .admin(
            "POST",
            "/api/admin/testimonials/reorder",
            Some(json!({ "items": [
                { "id": a, "order": 0 },
                { "id": b, "order": 1 },
                { "id": c, "order": 2 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(ids(&list), vec![a, b, c]);

    let (status, body) = app
        .admin(
            "POST",
            "/api/admin/testimonials/reorder",
            Some(json!([
                { "id": b, "order": 0 },
                { "id": c, "order": 1 },
                { "id": a, "order": 2 },
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "updated": 3 }));
    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(ids(&list), vec![b, c, a]);

    let (status, body) = app
        .admin(
            "POST",
            "/api/admin/testimonials/reorder",
            Some(json!({ "items": [
                { "id": a, "order": 0 },
                { "id": a, "order": 1 },
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REORDER");
    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(ids(&list), vec![b, c, a]);
}

fn raw_admin_request(method: &str, uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-admin-key", ADMIN_KEY)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn assert_error_body(body: &Value, code: &str) {
    assert_eq!(body["error"]["code"], code, "{body}");
    assert!(
        body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()),
        "{body}"
    );
}

#[tokio::test]
async fn undecodable_requests_use_the_error_body() {
    let app = TestApp::new("rejections").await;

    let (status, body) = app
        .send(raw_admin_request(
            "POST",
            "/api/admin/testimonials",
            "application/json",
            "{not json",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_REQUEST");

    let (status, body) = app
        .send(raw_admin_request(
            "POST",
            "/api/admin/faq",
            "application/json",
            r#"{"question": 42}"#,
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_error_body(&body, "INVALID_REQUEST");

    let (status, body) = app
        .send(raw_admin_request(
            "POST",
            "/api/admin/testimonials/reorder",
            "text/plain",
            "[]",
        ))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_error_body(&body, "INVALID_REQUEST");

    let (status, body) = app
        .admin("PUT", "/api/admin/faq/abc", Some(json!({ "answer": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_REQUEST");

    let (status, body) = app
        .send(raw_admin_request(
            "PUT",
            "/api/admin/site-config/hero",
            "application/json",
            "{\"title\": ",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_REQUEST");
    assert!(app.db.storage.get_all_site_configs().await.unwrap().is_empty());
}

#[tokio::test]
async fn public_lists_hide_inactive_rows() {
    let app = TestApp::new("public").await;

    let (_, shown) = app
        .admin(
            "POST",
            "/api/admin/services",
            Some(json!({ "title": "Terapia individual", "description": "Sessões de 50 minutos" })),
        )
        .await;
    let (_, hidden) = app
        .admin(
            "POST",
            "/api/admin/services",
            Some(json!({
                "title": "Supervisão",
                "description": "Para profissionais",
                "isActive": false,
            })),
        )
        .await;

    let (status, public) = app.call("GET", "/api/services", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&public), vec![shown["id"].as_i64().unwrap()]);

    let (_, all) = app.admin("GET", "/api/admin/services", None).await;
    assert_eq!(ids(&all).len(), 2);

    let hidden_id = hidden["id"].as_i64().unwrap();
    app.admin(
        "PUT",
        &format!("/api/admin/services/{hidden_id}"),
        Some(json!({ "isActive": true })),
    )
    .await;
    let (_, public) = app.call("GET", "/api/services", None, None).await;
    assert_eq!(ids(&public).len(), 2);

    for collection in ["testimonials", "faq", "specialties", "gallery", "credentials"] {
        let (status, body) = app
            .call("GET", &format!("/api/{collection}"), None, None)
            .await;
        assert_eq!(status, StatusCode::OK, "GET /api/{collection}");
        assert_eq!(body, json!([]));
    }
}

#[tokio::test]
async fn site_config_endpoints() {
    let app = TestApp::new("site-config").await;

    let (status, body) = app.call("GET", "/api/site-config/hero", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, saved) = app
        .admin(
            "PUT",
            "/api/admin/site-config/hero",
            Some(json!({ "title": "Psicóloga Clínica", "subtitle": "Atendimento online" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["key"], "hero");
    assert_eq!(saved["value"]["title"], "Psicóloga Clínica");

    app.admin(
        "PUT",
        "/api/admin/site-config/hero",
        Some(json!({ "title": "Psicologia e Acolhimento" })),
    )
    .await;
    let (status, fetched) = app.call("GET", "/api/site-config/hero", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], saved["id"]);
    assert_eq!(fetched["value"], json!({ "title": "Psicologia e Acolhimento" }));

    let (_, all) = app.call("GET", "/api/site-config", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (_, body) = app.admin("DELETE", "/api/admin/site-config/hero", None).await;
    assert_eq!(body["deleted"], true);
    let (status, _) = app.call("GET", "/api/site-config/hero", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_gate_lives_under_the_configured_path() {
    let app = TestApp::new("gate").await;

    let (status, body) = app.call("GET", &format!("/{ADMIN_PATH}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], "admin-login");
    assert_eq!(body["dashboard"], format!("/{ADMIN_PATH}/dashboard"));

    let (status, body) = app
        .call("GET", &format!("/{ADMIN_PATH}/dashboard"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], "admin-dashboard");

    let (status, _) = app.call("GET", "/admin", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn testimonial_image_upload_and_removal() {
    let app = TestApp::new("images").await;
    let (_, created) = app
        .admin("POST", "/api/admin/testimonials", Some(testimonial("Ana", 5)))
        .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/admin/testimonials/{id}/image");
    let png = b"\x89PNG\r\n\x1a\nnot-really-a-png";

    let (status, body) = app.send(upload_request(&uri, "image/png", png)).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["imageUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/testimonials/"), "{url}");
    assert!(url.ends_with(".png"), "{url}");

    let file = app.uploads.join(url.trim_start_matches("/uploads/"));
    assert_eq!(std::fs::read(&file).unwrap(), png);

    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(list[0]["photo"], url);

    let (status, _) = app.call("GET", &url, None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.admin("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!file.exists());
    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(list[0]["photo"], Value::Null);
}

#[tokio::test]
async fn deleting_a_testimonial_removes_its_photo() {
    let app = TestApp::new("delete-photo").await;
    let (_, created) = app
        .admin("POST", "/api/admin/testimonials", Some(testimonial("Ana", 5)))
        .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/admin/testimonials/{id}/image");

    let (status, body) = app
        .send(upload_request(&uri, "image/jpeg", b"\xff\xd8\xff jpeg"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["imageUrl"].as_str().unwrap().to_string();
    let file = app.uploads.join(url.trim_start_matches("/uploads/"));
    assert!(file.exists());

    let (status, body) = app
        .admin("DELETE", &format!("/api/admin/testimonials/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "deleted": true }));
    assert!(!file.exists());

    let (status, _) = app.send(upload_request(&uri, "image/png", b"png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let testimonials_dir = app.uploads.join("testimonials");
    let leftover = std::fs::read_dir(&testimonials_dir)
        .map(|dir| dir.count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn image_upload_rejections() {
    let app = TestApp::new("image-reject").await;
    let (_, created) = app
        .admin("POST", "/api/admin/testimonials", Some(testimonial("Ana", 5)))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .send(upload_request(
            &format!("/api/admin/testimonials/{id}/image"),
            "text/plain",
            b"hello",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_UPLOAD");

    let (status, body) = app
        .send(raw_admin_request(
            "POST",
            &format!("/api/admin/testimonials/{id}/image"),
            "application/json",
            "{}",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "INVALID_REQUEST");

    let (status, _) = app
        .send(upload_request(
            "/api/admin/testimonials/9999/image",
            "image/png",
            b"png",
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut unauthenticated = upload_request(
        &format!("/api/admin/testimonials/{id}/image"),
        "image/png",
        b"png",
    );
    unauthenticated.headers_mut().remove("x-admin-key");
    let (status, _) = app.send(unauthenticated).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_image_is_rejected() {
    let app = TestApp::with_image_limit("image-size", 1024).await;
    let (_, created) = app
        .admin("POST", "/api/admin/testimonials", Some(testimonial("Ana", 5)))
        .await;
    let id = created["id"].as_i64().unwrap();

    let big = vec![0u8; 4096];
    let (status, body) = app
        .send(upload_request(
            &format!("/api/admin/testimonials/{id}/image"),
            "image/jpeg",
            &big,
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");

    let (_, list) = app.admin("GET", "/api/admin/testimonials", None).await;
    assert_eq!(list[0]["photo"], Value::Null);
}
