//! Recording adapter for the `QuoteSource` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::quote_source::{QuoteFuture, QuoteSource};

/// Records quote lookups while delegating to an inner implementation.
pub struct RecordingQuoteSource {
    inner: Box<dyn QuoteSource>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingQuoteSource {
    /// Creates a new recording source wrapping the given implementation.
    pub fn new(inner: Box<dyn QuoteSource>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl QuoteSource for RecordingQuoteSource {
    fn random(&self, tag: &str) -> QuoteFuture<'_> {
        let tag = tag.to_string();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.random(&tag).await;
            record_result(&recorder, "quote_source", "random", &tag, &result);
            result
        })
    }
}
