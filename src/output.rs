//! Export file naming and writing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::CardError;

/// File name for an exported card: `quote-<unix millis>.png`.
#[must_use]
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("quote-{}.png", at.timestamp_millis())
}

/// Write PNG bytes into `dir` under a fresh export file name.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn write_export(dir: &Path, png: &[u8]) -> Result<PathBuf, CardError> {
    if png.is_empty() {
        return Err(CardError::Capture("Failed to capture image".into()));
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(Utc::now()));
    std::fs::write(&path, png)?;
    Ok(path)
}

/// Append a `random=<millis>` cache buster to a photo URL.
#[must_use]
pub fn cache_busted(base: &str, at: DateTime<Utc>) -> String {
    let stamp = at.timestamp_millis().to_string();
    match url::Url::parse(base) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair("random", &stamp);
            parsed.into()
        }
        Err(_) => {
            let sep = if base.contains('?') { '&' } else { '?' };
            format!("{base}{sep}random={stamp}")
        }
    }
}
