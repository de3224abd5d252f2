//! Native-like platform: images go to a file cache, exports to the gallery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use super::{Persisted, Platform, PlatformFuture};
use crate::cache::{FileCache, ImageRef};
use crate::error::CardError;
use crate::output::export_filename;
use crate::ports::{MediaLibrary, Permission, PhotoSource};
use crate::render::{encode_png, rasterize};
use crate::surface::Surface;

/// Shown when the gallery refuses write access.
pub const PERMISSION_MESSAGE: &str = "Sorry, we need camera roll permissions to save the image!";

static CAPTURE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Caches images on disk and saves exports into a gallery album.
pub struct NativePlatform {
    photos: Arc<dyn PhotoSource>,
    cache: FileCache,
    media: Arc<dyn MediaLibrary>,
    album: String,
    capture_delay: Duration,
}

impl NativePlatform {
    /// Create a native platform.
    pub fn new(
        photos: Arc<dyn PhotoSource>,
        cache: FileCache,
        media: Arc<dyn MediaLibrary>,
        album: impl Into<String>,
        capture_delay: Duration,
    ) -> Self {
        Self { photos, cache, media, album: album.into(), capture_delay }
    }

    async fn download(&self, url: &str) -> Result<ImageRef, CardError> {
        if let Some(path) = self.cache.lookup(url)? {
            debug!(path = %path.display(), "reusing cached image");
            return Ok(ImageRef::File(path));
        }
        let fetched = self.photos.fetch(url).await?;
        self.cache.store(url, &fetched.data).map(ImageRef::File)
    }
}

impl Platform for NativePlatform {
    fn cache_image<'a>(&'a self, url: &'a str) -> PlatformFuture<'a, ImageRef> {
        Box::pin(async move {
            self.download(url).await.unwrap_or_else(|e| {
                warn!(%url, "caching image failed, using remote URL: {e}");
                ImageRef::Remote(url.to_string())
            })
        })
    }

    fn authorize_export(&self) -> PlatformFuture<'_, Result<(), CardError>> {
        Box::pin(async move {
            match self.media.request_permission().await? {
                Permission::Granted => Ok(()),
                Permission::Denied => Err(CardError::PermissionDenied(PERMISSION_MESSAGE.into())),
            }
        })
    }

    fn capture_delay(&self) -> Option<Duration> {
        Some(self.capture_delay)
    }

    fn capture_surface(
        &self,
        surface: &Surface,
        _cached: Option<&ImageRef>,
    ) -> Result<Vec<u8>, CardError> {
        encode_png(&rasterize(surface)?)
    }

    fn persist_artifact(&self, png: Vec<u8>) -> PlatformFuture<'_, Result<Persisted, CardError>> {
        Box::pin(async move {
            if png.is_empty() {
                return Err(CardError::Capture("Failed to capture image".into()));
            }
            let seq = CAPTURE_SEQ.fetch_add(1, Ordering::Relaxed);
            let capture = std::env::temp_dir()
                .join(format!("quotecard-{}-{seq}", std::process::id()))
                .join(export_filename(Utc::now()));
            if let Some(parent) = capture.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&capture, &png)?;

            let saved = async {
                let asset = self.media.create_asset(&capture).await?;
                self.media.add_to_album(&self.album, &asset).await
            }
            .await;
            if let Some(parent) = capture.parent() {
                let _ = std::fs::remove_dir_all(parent);
            }

            saved.map(|asset| Persisted::SavedToGallery(asset.path))
        })
    }
}
