//! Web-like platform: images become data URLs, exports become downloads.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use super::{Persisted, Platform, PlatformFuture};
use crate::cache::{detect_mime, encode_data_url, ImageRef};
use crate::error::CardError;
use crate::output::write_export;
use crate::ports::PhotoSource;
use crate::render::{encode_png, rasterize};
use crate::state::AppState;
use crate::surface::Surface;

/// Caches images in memory and downloads exports into a directory.
pub struct WebPlatform {
    photos: Arc<dyn PhotoSource>,
    downloads_dir: PathBuf,
}

impl WebPlatform {
    /// Create a web platform saving downloads into `downloads_dir`.
    pub fn new(photos: Arc<dyn PhotoSource>, downloads_dir: impl Into<PathBuf>) -> Self {
        Self { photos, downloads_dir: downloads_dir.into() }
    }
}

impl Platform for WebPlatform {
    fn cache_image<'a>(&'a self, url: &'a str) -> PlatformFuture<'a, ImageRef> {
        Box::pin(async move {
            match self.photos.fetch(url).await {
                Ok(fetched) => {
                    let mime = detect_mime(fetched.content_type.as_deref(), &fetched.data);
                    ImageRef::DataUrl(encode_data_url(&mime, &fetched.data))
                }
                Err(e) => {
                    warn!(%url, "caching image failed, using remote URL: {e}");
                    ImageRef::Remote(url.to_string())
                }
            }
        })
    }

    fn on_screen_background(&self, state: &AppState) -> Option<ImageRef> {
        // The page keeps loading the photo from its source URL.
        state.image_loaded.then(|| ImageRef::Remote(state.image_url.clone()))
    }

    fn capture_surface(
        &self,
        surface: &Surface,
        cached: Option<&ImageRef>,
    ) -> Result<Vec<u8>, CardError> {
        // The working copy draws the embedded bytes, never the live source.
        let working = match &surface.background {
            Some(ImageRef::Remote(_)) => surface.with_background(cached.cloned()),
            _ => surface.clone(),
        };
        encode_png(&rasterize(&working)?)
    }

    fn persist_artifact(&self, png: Vec<u8>) -> PlatformFuture<'_, Result<Persisted, CardError>> {
        Box::pin(async move { write_export(&self.downloads_dir, &png).map(Persisted::Downloaded) })
    }
}
