//! Replaying adapter for the `QuoteSource` port.

use super::{replay, SharedReplayer};
use crate::ports::quote_source::{Quote, QuoteFuture, QuoteSource};

/// Serves recorded quotes from a cassette.
pub struct ReplayingQuoteSource {
    replayer: SharedReplayer,
}

impl ReplayingQuoteSource {
    /// Create a replaying source backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl QuoteSource for ReplayingQuoteSource {
    fn random(&self, _tag: &str) -> QuoteFuture<'_> {
        let result = replay::<Quote>(&self.replayer, "quote_source", "random");
        Box::pin(async move { result })
    }
}
