//! Typed client for the admin API.
//!
//! [`CollectionClient`] implements [`ContentSink`], so a
//! [`CollectionEditor`](crate::editor::CollectionEditor) can run against a
//! remote server exactly as it runs against the database.

use reqwest::{Method, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::db::SiteConfig;
use crate::editor::{ContentSink, OrderEntry};
use crate::error::{ApiErrorResponse, CmsError};
use crate::types::{Content, DeleteResponse, ImageUploadResponse, ReorderRequest, ReorderResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base: Url,
    admin_key: Arc<str>,
}

impl AdminClient {
    pub fn new(base_url: &str, admin_key: impl Into<Arc<str>>) -> Result<Self, CmsError> {
        Self::with_timeout(base_url, admin_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        admin_key: impl Into<Arc<str>>,
        timeout: Duration,
    ) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: Url::parse(base_url)?,
            admin_key: admin_key.into(),
        })
    }

    pub fn collection<T: Content>(&self) -> CollectionClient<T> {
        CollectionClient {
            client: self.clone(),
            _marker: PhantomData,
        }
    }

    pub async fn upload_testimonial_image(
        &self,
        id: i64,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, CmsError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("image", part);
        let resp: ImageUploadResponse = self
            .send(
                self.request(Method::POST, &format!("/api/admin/testimonials/{id}/image"))?
                    .multipart(form),
            )
            .await?;
        Ok(resp.image_url)
    }

    pub async fn remove_testimonial_image(&self, id: i64) -> Result<(), CmsError> {
        let _: Value = self
            .send(self.request(Method::DELETE, &format!("/api/admin/testimonials/{id}/image"))?)
            .await?;
        Ok(())
    }

    pub async fn site_configs(&self) -> Result<Vec<SiteConfig>, CmsError> {
        self.send(self.request(Method::GET, "/api/admin/site-config")?)
            .await
    }

    pub async fn set_site_config(&self, key: &str, value: &Value) -> Result<SiteConfig, CmsError> {
        self.send(
            self.request_url(Method::PUT, self.site_config_url(key)?)
                .json(value),
        )
        .await
    }

    pub async fn delete_site_config(&self, key: &str) -> Result<bool, CmsError> {
        let resp: DeleteResponse = self
            .send(self.request_url(Method::DELETE, self.site_config_url(key)?))
            .await?;
        Ok(resp.deleted)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CmsError> {
        Ok(self.request_url(method, self.base.join(path)?))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("x-admin-key", self.admin_key.as_ref())
    }

    /// Keys are free text; `/`, `?` and `#` must stay inside the last segment.
    fn site_config_url(&self, key: &str) -> Result<Url, CmsError> {
        let mut url = self.base.join("/api/admin/site-config")?;
        url.path_segments_mut()
            .map_err(|_| CmsError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(key);
        Ok(url)
    }

    async fn send<R: DeserializeOwned>(&self, req: RequestBuilder) -> Result<R, CmsError> {
        let resp = req.send().await?;
        decode(resp).await
    }
}

/// Decode a success body, or turn the standard error body into `CmsError::Remote`.
async fn decode<R: DeserializeOwned>(resp: Response) -> Result<R, CmsError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<R>().await?);
    }
    let body = resp.bytes().await?;
    let (code, message) = match serde_json::from_slice::<ApiErrorResponse>(&body) {
        Ok(parsed) => (parsed.error.code, parsed.error.message),
        Err(_) => (
            "HTTP_ERROR".to_string(),
            String::from_utf8_lossy(&body).into_owned(),
        ),
    };
    Err(CmsError::Remote {
        status,
        code,
        message,
    })
}

/// Admin endpoints of one collection, e.g. `/api/admin/testimonials`.
pub struct CollectionClient<T> {
    client: AdminClient,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionClient<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Content> CollectionClient<T> {
    fn path(suffix: &str) -> String {
        format!("/api/admin/{}{suffix}", T::COLLECTION)
    }

    pub async fn list(&self) -> Result<Vec<T>, CmsError> {
        let c = &self.client;
        c.send(c.request(Method::GET, &Self::path(""))?).await
    }

    pub async fn create(&self, new: &T::New) -> Result<T, CmsError> {
        let c = &self.client;
        c.send(c.request(Method::POST, &Self::path(""))?.json(new))
            .await
    }

    pub async fn update(&self, id: i64, patch: &T::Patch) -> Result<T, CmsError> {
        let c = &self.client;
        c.send(c.request(Method::PUT, &Self::path(&format!("/{id}")))?.json(patch))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, CmsError> {
        let c = &self.client;
        let resp: DeleteResponse = c
            .send(c.request(Method::DELETE, &Self::path(&format!("/{id}")))?)
            .await?;
        Ok(resp.deleted)
    }

    pub async fn reorder(&self, entries: &[OrderEntry]) -> Result<u64, CmsError> {
        let c = &self.client;
        let body = ReorderRequest::Keyed {
            items: entries.to_vec(),
        };
        let resp: ReorderResponse = c
            .send(c.request(Method::POST, &Self::path("/reorder"))?.json(&body))
            .await?;
        Ok(resp.updated)
    }
}

impl<T: Content> ContentSink<T> for CollectionClient<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, CmsError> {
        self.list().await
    }

    async fn persist_order(&self, entries: &[OrderEntry]) -> Result<(), CmsError> {
        self.reorder(entries).await.map(|_| ())
    }

    async fn create(&self, new: &T::New) -> Result<T, CmsError> {
        CollectionClient::create(self, new).await
    }

    async fn update(&self, id: i64, patch: &T::Patch) -> Result<T, CmsError> {
        CollectionClient::update(self, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<(), CmsError> {
        CollectionClient::delete(self, id).await.map(|_| ())
    }
}
