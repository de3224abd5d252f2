//! Service context that bundles all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::photos::HttpPhotoSource;
use crate::adapters::live::quotable::QuotableSource;
use crate::adapters::recording::photo_source::RecordingPhotoSource;
use crate::adapters::recording::quote_source::RecordingQuoteSource;
use crate::adapters::replaying::photo_source::ReplayingPhotoSource;
use crate::adapters::replaying::quote_source::ReplayingQuoteSource;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::error::CardError;
use crate::ports::{PhotoSource, QuoteSource};

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Quote source port.
    pub quotes: Box<dyn QuoteSource>,
    /// Photo source port, shared with the platform's image cache.
    pub photos: Arc<dyn PhotoSource>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<std::path::PathBuf, CardError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| CardError::Config("Recording adapters still hold references".into()))?
            .into_inner()
            .map_err(|e| CardError::Config(format!("Recorder lock poisoned: {e}")))?;
        recorder.finish()
    }
}

impl ServiceContext {
    /// Create a live context talking to the configured endpoints.
    #[must_use]
    pub fn live(config: &Config) -> Self {
        Self {
            quotes: Box::new(QuotableSource::new(config.quote_url())),
            photos: Arc::new(HttpPhotoSource::new()),
        }
    }

    /// Create a recording context that wraps live adapters with a recorder.
    #[must_use]
    pub fn recording(config: &Config) -> (Self, RecordingSession) {
        let live = Self::live(config);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let dir = Path::new(".quotecard/cassettes").join(timestamp);
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&dir, commit_hash())));

        let ctx = Self {
            quotes: Box::new(RecordingQuoteSource::new(live.quotes, Arc::clone(&recorder))),
            photos: Arc::new(RecordingPhotoSource::new(
                Box::new(HttpPhotoSource::new()),
                Arc::clone(&recorder),
            )),
        };
        (ctx, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, CardError> {
        let replayer = Arc::new(Mutex::new(CassetteReplayer::new(Cassette::load(path)?)));
        Ok(Self {
            quotes: Box::new(ReplayingQuoteSource::new(Arc::clone(&replayer))),
            photos: Arc::new(ReplayingPhotoSource::new(replayer)),
        })
    }
}

/// `HEAD` of the enclosing git checkout, or `unknown`.
fn commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
