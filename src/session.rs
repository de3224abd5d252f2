//! The single-screen session: user actions in, state transitions out.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::cache::ImageRef;
use crate::error::CardError;
use crate::output::cache_busted;
use crate::platform::{Persisted, Platform};
use crate::ports::QuoteSource;
use crate::state::{Action, AppState, Notice};
use crate::surface::{Layout, Surface};
use crate::tags::validate_tag;

/// Drives quote fetches, background changes and exports against one state.
pub struct Session {
    quotes: Box<dyn QuoteSource>,
    platform: Arc<dyn Platform>,
    photo_url: String,
    layout: Layout,
    state: Mutex<AppState>,
}

impl Session {
    /// Start a session on `tag`, with `photo_url` as the initial background.
    pub fn new(
        quotes: Box<dyn QuoteSource>,
        platform: Arc<dyn Platform>,
        tag: &str,
        photo_url: impl Into<String>,
        layout: Layout,
    ) -> Self {
        let photo_url = photo_url.into();
        let state = AppState::new(tag, photo_url.clone());
        Self { quotes, platform, photo_url, layout, state: Mutex::new(state) }
    }

    /// Current state.
    pub fn state(&self) -> AppState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Current render surface.
    pub fn surface(&self) -> Surface {
        let state = self.state();
        Surface::from_state(&state, self.layout)
            .with_background(self.platform.on_screen_background(&state))
    }

    fn dispatch(&self, action: Action) -> AppState {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.reduce(action);
        guard.clone()
    }

    /// Pick a tag and fetch a quote for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is not in the fixed set.
    pub async fn select_tag(&self, tag: &str) -> Result<(), CardError> {
        validate_tag(tag).map_err(CardError::InvalidArgument)?;
        self.dispatch(Action::TagSelected(tag.to_string()));
        self.refresh_quote().await;
        Ok(())
    }

    /// Fetch a new quote for the selected tag. Failures keep the old quote.
    pub async fn refresh_quote(&self) {
        let requested = self.dispatch(Action::QuoteRequested);
        let token = requested.quote_token();
        let tag = requested.tag;

        let quote = match self.quotes.random(&tag).await {
            Ok(quote) => {
                debug!(%tag, author = %quote.author, "quote fetched");
                Some(quote)
            }
            Err(e) => {
                error!(%tag, "Error fetching quote: {e}");
                None
            }
        };

        let next = self.dispatch(Action::QuoteResolved { token, quote });
        if next.quote_token() != token {
            debug!(token, latest = next.quote_token(), "stale quote discarded");
        }
    }

    /// Switch to a fresh random photo.
    pub async fn change_background(&self) -> ImageRef {
        let url = cache_busted(&self.photo_url, Utc::now());
        self.load_background(&url).await
    }

    /// Switch the background to `url` and cache it.
    pub async fn load_background(&self, url: &str) -> ImageRef {
        let token = self.dispatch(Action::ImageRequested(url.to_string())).image_token();
        let reference = self.platform.cache_image(url).await;
        info!(%reference, "background cached");
        self.dispatch(Action::ImageCached { token, reference: reference.clone() });
        reference
    }

    /// Press the export button. Returns `None` when the button is disabled.
    pub async fn export(&self) -> Option<Notice> {
        if self.state().is_exporting {
            debug!("export already running");
            return None;
        }
        self.dispatch(Action::ExportStarted);

        let notice = match self.export_inner().await {
            Ok(Persisted::Downloaded(path)) => {
                Notice::Success(format!("Saved: {}", path.display()))
            }
            Ok(Persisted::SavedToGallery(path)) => {
                Notice::Success(format!("Image saved to gallery! ({})", path.display()))
            }
            Err(CardError::PermissionDenied(message)) => Notice::Failure(message),
            Err(e) => {
                error!("Error exporting image: {e}");
                Notice::Failure(format!("Failed to save image: {e}"))
            }
        };

        self.dispatch(Action::ExportFinished(notice.clone()));
        Some(notice)
    }

    async fn export_inner(&self) -> Result<Persisted, CardError> {
        self.platform.authorize_export().await?;

        let mut state = self.state();
        if !state.image_loaded {
            if let Some(delay) = self.platform.capture_delay() {
                debug!(?delay, "background still loading, delaying capture");
                tokio::time::sleep(delay).await;
                state = self.state();
            }
        }

        let surface = Surface::from_state(&state, self.layout)
            .with_background(self.platform.on_screen_background(&state));
        let png = self.platform.capture_surface(&surface, state.cached_image.as_ref())?;
        self.platform.persist_artifact(png).await
    }
}
