//! Media library port for the native gallery.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::error::CardError;

/// Outcome of a runtime permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Writes are allowed.
    Granted,
    /// The user (or the device) refused.
    Denied,
}

/// An asset registered with the media library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Location of the asset inside the library.
    pub path: PathBuf,
}

/// Boxed future type returned by [`MediaLibrary`] operations.
pub type MediaFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CardError>> + Send + 'a>>;

/// Device gallery that stores exported cards.
pub trait MediaLibrary: Send + Sync {
    /// Ask for permission to write to the library.
    fn request_permission(&self) -> MediaFuture<'_, Permission>;

    /// Import the file at `source` as a new asset.
    fn create_asset<'a>(&'a self, source: &'a Path) -> MediaFuture<'a, Asset>;

    /// Place `asset` into `album`, creating the album if absent.
    fn add_to_album<'a>(&'a self, album: &'a str, asset: &'a Asset) -> MediaFuture<'a, Asset>;
}
