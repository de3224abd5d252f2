//! Locally resolvable image references and the on-disk image cache.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use base64::Engine;
use tracing::{debug, info};

use crate::error::CardError;

/// A handle to the background image bytes shared by rendering and export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Bytes embedded in a `data:` URL.
    DataUrl(String),
    /// A file in the local cache directory.
    File(PathBuf),
    /// The original remote URL; used when caching failed.
    Remote(String),
}

impl ImageRef {
    /// Read the referenced bytes back.
    ///
    /// # Errors
    ///
    /// Returns an error for a remote reference, a malformed data URL, or an
    /// unreadable file.
    pub fn read_bytes(&self) -> Result<Vec<u8>, CardError> {
        match self {
            Self::DataUrl(url) => decode_data_url(url).map(|(_, data)| data),
            Self::File(path) => Ok(std::fs::read(path)?),
            Self::Remote(url) => {
                Err(CardError::Cache(format!("{url} is not cached locally")))
            }
        }
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataUrl(url) => {
                let header = url.split(',').next().unwrap_or_default();
                write!(f, "{header},… ({} chars)", url.len())
            }
            Self::File(path) => write!(f, "file://{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// Pick a MIME type: an `image/*` content type if the server sent one,
/// otherwise whatever the bytes look like.
#[must_use]
pub fn detect_mime(content_type: Option<&str>, data: &[u8]) -> String {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if essence.starts_with("image/") {
            return essence;
        }
    }
    image::guess_format(data)
        .map_or_else(|_| "application/octet-stream".to_string(), |f| f.to_mime_type().to_string())
}

/// Embed bytes in a self-contained `data:` URL.
#[must_use]
pub fn encode_data_url(mime: &str, data: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{payload}")
}

/// Split a base64 `data:` URL into its MIME type and bytes.
///
/// # Errors
///
/// Returns an error if the URL is not a base64 data URL.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), CardError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CardError::Cache("not a data URL".to_string()))?;
    let (header, payload) =
        rest.split_once(',').ok_or_else(|| CardError::Cache("data URL has no payload".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| CardError::Cache("only base64 data URLs are supported".into()))?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| CardError::Cache(format!("Failed to decode data URL: {e}")))?;
    Ok((mime.to_string(), data))
}

/// Cache filename for a URL: its final path segment, query ignored.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed or has no usable segment.
pub fn cache_filename(url: &str) -> Result<String, CardError> {
    let parsed = url::Url::parse(url).map_err(|e| CardError::Cache(format!("{url}: {e}")))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return Err(CardError::Cache(format!("{url} has no file name to cache under")));
    }
    Ok(name.to_string())
}

/// Directory of downloaded images, one file per URL basename.
///
/// Files are never revalidated: an existing name is assumed to hold the
/// same content.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    max_entries: Option<usize>,
}

impl FileCache {
    /// Create a cache over `dir`, optionally bounded to `max_entries` files.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_entries: Option<usize>) -> Self {
        Self { dir: dir.into(), max_entries }
    }

    /// Path of an already cached file for `url`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no usable file name.
    pub fn lookup(&self, url: &str) -> Result<Option<PathBuf>, CardError> {
        let path = self.dir.join(cache_filename(url)?);
        Ok(path.is_file().then_some(path))
    }

    /// Write `data` under the file name derived from `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no usable file name or the write fails.
    pub fn store(&self, url: &str, data: &[u8]) -> Result<PathBuf, CardError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(cache_filename(url)?);
        std::fs::write(&path, data)?;
        debug!(path = %path.display(), bytes = data.len(), "cached image");
        if let Some(max) = self.max_entries {
            self.evict(max, &path)?;
        }
        Ok(path)
    }

    /// Delete the oldest files until at most `max` remain; `keep` survives.
    fn evict(&self, max: usize, keep: &Path) -> Result<(), CardError> {
        let mut entries: Vec<(SystemTime, PathBuf)> = std::fs::read_dir(&self.dir)?
            .flatten()
            .filter(|e| e.path().is_file())
            .map(|e| {
                let modified =
                    e.metadata().and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, e.path())
            })
            .collect();
        if entries.len() <= max {
            return Ok(());
        }
        entries.sort();
        let mut excess = entries.len() - max;
        for (_, path) in entries {
            if excess == 0 {
                break;
            }
            if path == keep {
                continue;
            }
            std::fs::remove_file(&path)?;
            info!(path = %path.display(), "evicted cached image");
            excess -= 1;
        }
        Ok(())
    }
}
