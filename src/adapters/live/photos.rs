//! Live adapter that downloads photos over HTTP.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use crate::error::CardError;
use crate::ports::photo_source::{FetchFuture, FetchedImage, PhotoSource};

/// Live photo source backed by `reqwest`.
pub struct HttpPhotoSource {
    client: Client,
}

impl HttpPhotoSource {
    /// Create a new photo source.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpPhotoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoSource for HttpPhotoSource {
    fn fetch(&self, url: &str) -> FetchFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            debug!(%url, "downloading photo");
            let response = self.client.get(&url).send().await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(CardError::Api { status: status.as_u16(), message });
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let data = response.bytes().await?.to_vec();
            debug!(bytes = data.len(), ?content_type, "photo downloaded");

            Ok(FetchedImage { data, content_type })
        })
    }
}
