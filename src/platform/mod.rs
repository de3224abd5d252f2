//! Platform capabilities: how images are cached and how cards are exported.
//!
//! One implementation is chosen at startup. The session never branches on
//! the platform itself.

pub mod native;
pub mod web;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::ImageRef;
use crate::error::CardError;
use crate::state::AppState;
use crate::surface::Surface;

pub use native::NativePlatform;
pub use web::WebPlatform;

/// Which capability set to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Data-URL cache, download to a directory.
    Web,
    /// File cache, save into a gallery album.
    Native,
}

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    /// Written as a download.
    Downloaded(PathBuf),
    /// Filed into the gallery album.
    SavedToGallery(PathBuf),
}

/// Boxed future type returned by [`Platform`] operations.
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The platform-specific half of caching and exporting.
pub trait Platform: Send + Sync {
    /// Materialize `url` locally. Never fails: on error the remote URL comes
    /// back unchanged.
    fn cache_image<'a>(&'a self, url: &'a str) -> PlatformFuture<'a, ImageRef>;

    /// What the background layer shows on screen for `state`.
    fn on_screen_background(&self, state: &AppState) -> Option<ImageRef> {
        state.displayed_image().cloned()
    }

    /// Gate an export on platform permissions.
    fn authorize_export(&self) -> PlatformFuture<'_, Result<(), CardError>> {
        Box::pin(async { Ok(()) })
    }

    /// How long to wait for a still-loading background before capturing.
    fn capture_delay(&self) -> Option<Duration> {
        None
    }

    /// Rasterize the surface to PNG bytes. `cached` is the current cached
    /// image reference, regardless of load state.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture is empty or cannot be encoded.
    fn capture_surface(
        &self,
        surface: &Surface,
        cached: Option<&ImageRef>,
    ) -> Result<Vec<u8>, CardError>;

    /// Hand PNG bytes to the persistence sink.
    fn persist_artifact(&self, png: Vec<u8>) -> PlatformFuture<'_, Result<Persisted, CardError>>;
}
