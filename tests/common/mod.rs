#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use practice_cms::db::{ContentStorage, connect};
use practice_cms::router::{CmsState, cms_router};
use practice_cms::uploads::ImageStore;
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "test-admin-key";
pub const ADMIN_PATH: &str = "0c1d2e3f";

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn temp_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);

    let mut path = std::env::temp_dir();
    path.push(format!(
        "practice-cms-{tag}-{}-{nanos}-{n}",
        std::process::id()
    ));
    path
}

pub struct TestDb {
    pub storage: ContentStorage,
    pub path: PathBuf,
}

impl TestDb {
    pub async fn new(tag: &str) -> Self {
        let path = temp_path(tag).with_extension("sqlite");
        let database_url = format!("sqlite:{}", path.display());
        let pool = connect(&database_url, 1)
            .await
            .expect("failed to open sqlite database");
        let storage = ContentStorage::new(pool);
        storage.init_schema().await.expect("failed to init schema");
        Self { storage, path }
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub struct TestApp {
    pub db: TestDb,
    pub uploads: PathBuf,
    pub router: Router,
}

impl TestApp {
    pub async fn new(tag: &str) -> Self {
        Self::with_image_limit(tag, 5 * 1024 * 1024).await
    }

    pub async fn with_image_limit(tag: &str, max_image_bytes: usize) -> Self {
        let db = TestDb::new(tag).await;
        let uploads = temp_path(&format!("{tag}-uploads"));
        fs::create_dir_all(&uploads).expect("failed to create uploads dir");

        let state = CmsState::new(
            db.storage.clone(),
            ImageStore::new(uploads.clone(), max_image_bytes),
            ADMIN_KEY,
            ADMIN_PATH,
        );
        let router = cms_router(state);
        Self {
            db,
            uploads,
            router,
        }
    }

    /// Send one request; the body is parsed as JSON (`Null` when empty).
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header("x-admin-key", key);
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&v).expect("serialize body"))
            }
            None => Body::empty(),
        };
        let req = builder.body(body).expect("failed to build request");
        self.send(req).await
    }

    pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, body, Some(ADMIN_KEY)).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("request failed");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.uploads);
    }
}

pub fn multipart_body(
    boundary: &str,
    field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
