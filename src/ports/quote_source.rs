//! Quote source port for the remote random-quote service.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::CardError;

/// A quote as displayed on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The quote text.
    pub content: String,
    /// Who said it.
    pub author: String,
}

/// Boxed future type returned by [`QuoteSource::random`].
pub type QuoteFuture<'a> = Pin<Box<dyn Future<Output = Result<Quote, CardError>> + Send + 'a>>;

/// Fetches one random quote constrained to a topic tag.
pub trait QuoteSource: Send + Sync {
    /// Fetch a random quote for `tag`.
    fn random(&self, tag: &str) -> QuoteFuture<'_>;
}
