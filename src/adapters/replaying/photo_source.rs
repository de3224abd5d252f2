//! Replaying adapter for the `PhotoSource` port.

use super::{replay, SharedReplayer};
use crate::ports::photo_source::{FetchFuture, FetchedImage, PhotoSource};

/// Serves recorded photo downloads from a cassette.
pub struct ReplayingPhotoSource {
    replayer: SharedReplayer,
}

impl ReplayingPhotoSource {
    /// Create a replaying source backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl PhotoSource for ReplayingPhotoSource {
    fn fetch(&self, _url: &str) -> FetchFuture<'_> {
        let result = replay::<FetchedImage>(&self.replayer, "photo_source", "fetch");
        Box::pin(async move { result })
    }
}
