//! Local directory storage for uploaded images.
//!
//! Files live under `<root>/<category>/` and are served at
//! `/uploads/<category>/<file>`.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::error::CmsError;

pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Check type and size, write the file, return its public URL.
    pub async fn save(
        &self,
        category: &str,
        stem: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, CmsError> {
        let ext = image_extension(content_type).ok_or_else(|| {
            CmsError::Upload(format!("unsupported content type `{content_type}`"))
        })?;
        if bytes.is_empty() {
            return Err(CmsError::Upload("empty file".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(CmsError::PayloadTooLarge);
        }

        let dir = self.root.join(category);
        fs::create_dir_all(&dir).await?;
        let file_name = format!("{stem}-{}.{ext}", Utc::now().timestamp_millis());
        fs::write(dir.join(&file_name), bytes).await?;

        let url = format!("{PUBLIC_PREFIX}/{category}/{file_name}");
        info!(url = %url, size = bytes.len(), "image stored");
        Ok(url)
    }

    /// Best-effort removal of a file previously returned by [`Self::save`].
    /// URLs that do not point into this store are ignored.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.local_path(url) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "failed to remove stored image");
        }
    }

    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let rel = url.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        if rel.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
            return None;
        }
        Some(self.root.join(rel))
    }
}

fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    let sub = mime.strip_prefix("image/")?;
    Some(match sub {
        "jpeg" | "jpg" | "pjpeg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        "avif" => "avif",
        "svg+xml" => "svg",
        _ => "img",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_image_types_get_an_extension() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/PNG; charset=binary"), Some("png"));
        assert_eq!(image_extension("image/x-icon"), Some("img"));
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_extension(""), None);
    }

    #[test]
    fn local_paths_stay_inside_root() {
        let store = ImageStore::new("/srv/uploads", 10);
        assert_eq!(
            store.local_path("/uploads/testimonials/a.jpg"),
            Some(PathBuf::from("/srv/uploads/testimonials/a.jpg"))
        );
        assert_eq!(store.local_path("/uploads/../etc/passwd"), None);
        assert_eq!(store.local_path("https://cdn.example.com/a.jpg"), None);
        assert_eq!(store.local_path("/uploadsx/a.jpg"), None);
    }
}
