//! Application state as an immutable record changed by discrete actions.
//!
//! Quote and image fetches each carry a request token. A resolution is
//! applied only if its token is the latest one issued for its category, so a
//! slow response to an older request can never overwrite a newer one.

use crate::cache::ImageRef;
use crate::ports::Quote;

/// A user-visible message raised by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The export was persisted.
    Success(String),
    /// The export failed or was refused.
    Failure(String),
}

impl Notice {
    /// The message text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Failure(m) => m,
        }
    }
}

/// A discrete state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A topic tag was picked.
    TagSelected(String),
    /// A quote fetch started; issues the next quote token.
    QuoteRequested,
    /// A quote fetch finished; `None` means it failed.
    QuoteResolved {
        /// Token of the request that produced this result.
        token: u64,
        /// The fetched quote.
        quote: Option<Quote>,
    },
    /// A new background URL was chosen; issues the next image token.
    ImageRequested(String),
    /// The background finished caching.
    ImageCached {
        /// Token of the request that produced this result.
        token: u64,
        /// Where the bytes now live.
        reference: ImageRef,
    },
    /// Export began.
    ExportStarted,
    /// Export ended with a notice for the user.
    ExportFinished(Notice),
}

/// Everything the render surface is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// Selected topic tag.
    pub tag: String,
    /// Source URL of the current background.
    pub image_url: String,
    /// Single cached-reference slot.
    pub cached_image: Option<ImageRef>,
    /// Whether `cached_image` belongs to `image_url` and may be displayed.
    pub image_loaded: bool,
    /// Displayed quote.
    pub quote: Option<Quote>,
    /// A quote fetch is in flight.
    pub is_loading: bool,
    /// An export is in flight.
    pub is_exporting: bool,
    /// Notice raised by the last export.
    pub notice: Option<Notice>,
    quote_token: u64,
    image_token: u64,
}

impl AppState {
    /// Initial state for a tag and background URL.
    #[must_use]
    pub fn new(tag: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            image_url: image_url.into(),
            cached_image: None,
            image_loaded: false,
            quote: None,
            is_loading: false,
            is_exporting: false,
            notice: None,
            quote_token: 0,
            image_token: 0,
        }
    }

    /// Latest issued quote token.
    #[must_use]
    pub fn quote_token(&self) -> u64 {
        self.quote_token
    }

    /// Latest issued image token.
    #[must_use]
    pub fn image_token(&self) -> u64 {
        self.image_token
    }

    /// The cached reference, only once it has finished caching.
    #[must_use]
    pub fn displayed_image(&self) -> Option<&ImageRef> {
        if self.image_loaded {
            self.cached_image.as_ref()
        } else {
            None
        }
    }

    /// Apply `action` and return the next state.
    #[must_use]
    pub fn reduce(&self, action: Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::TagSelected(tag) => next.tag = tag,
            Action::QuoteRequested => {
                next.quote_token += 1;
                next.is_loading = true;
            }
            Action::QuoteResolved { token, quote } => {
                if token == self.quote_token {
                    next.is_loading = false;
                    if let Some(quote) = quote {
                        next.quote = Some(quote);
                    }
                }
            }
            Action::ImageRequested(url) => {
                next.image_token += 1;
                next.image_url = url;
                next.image_loaded = false;
            }
            Action::ImageCached { token, reference } => {
                if token == self.image_token {
                    next.cached_image = Some(reference);
                    next.image_loaded = true;
                }
            }
            Action::ExportStarted => {
                next.is_exporting = true;
                next.notice = None;
            }
            Action::ExportFinished(notice) => {
                next.is_exporting = false;
                next.notice = Some(notice);
            }
        }
        next
    }
}
