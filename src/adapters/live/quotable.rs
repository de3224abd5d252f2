//! Live adapter for the Quotable random-quote API.

use reqwest::Client;
use tracing::debug;

use crate::error::CardError;
use crate::ports::quote_source::{Quote, QuoteFuture, QuoteSource};

/// Live quote source that calls `<base>/random?tags=<tag>`.
pub struct QuotableSource {
    client: Client,
    base_url: String,
}

impl QuotableSource {
    /// Create a new source against the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: Client::new(), base_url: base_url.into() }
    }

    fn endpoint(&self) -> String {
        format!("{}/random", self.base_url.trim_end_matches('/'))
    }
}

impl QuoteSource for QuotableSource {
    fn random(&self, tag: &str) -> QuoteFuture<'_> {
        let tag = tag.to_string();
        Box::pin(async move {
            let url = self.endpoint();
            debug!(%url, %tag, "requesting quote");

            let response = self.client.get(&url).query(&[("tags", tag.as_str())]).send().await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(CardError::Api { status: status.as_u16(), message: response_text });
            }

            serde_json::from_str::<Quote>(&response_text).map_err(|e| CardError::Api {
                status: status.as_u16(),
                message: format!("Failed to parse quote: {e}"),
            })
        })
    }
}
