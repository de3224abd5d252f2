//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::platform::PlatformKind;
use crate::tags::DEFAULT_TAG;

/// Default quote service base URL.
pub const DEFAULT_QUOTE_URL: &str = "https://api.quotable.io";

/// Default portrait photo endpoint.
pub const DEFAULT_PHOTO_URL: &str = "https://picsum.photos/1080/1920";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Remote endpoints.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Default selections used when CLI flags are absent.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Render surface layout.
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// Native image cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Export destinations.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Remote endpoint configuration.
#[derive(Debug, Default, Deserialize)]
pub struct SourcesConfig {
    /// Quote service base URL (`/random?tags=` is appended).
    pub quote_url: Option<String>,
    /// Photo endpoint.
    pub photo_url: Option<String>,
}

/// Default selections.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Topic tag.
    pub tag: String,
    /// Export platform.
    pub platform: PlatformKind,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { tag: DEFAULT_TAG.to_string(), platform: PlatformKind::Web }
    }
}

/// Render surface layout.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Device pixel density applied when rasterizing.
    pub pixel_ratio: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self { width: 430, height: 764, pixel_ratio: 1.0 }
    }
}

/// Native image cache settings.
#[derive(Debug, Default, Deserialize)]
pub struct CacheConfig {
    /// Cache directory (defaults to the platform cache dir).
    pub dir: Option<PathBuf>,
    /// Keep at most this many cached files; unlimited when unset.
    pub max_entries: Option<usize>,
}

/// Export destinations.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where web downloads land.
    pub downloads_dir: PathBuf,
    /// Root of the native media library.
    pub gallery_dir: Option<PathBuf>,
    /// Album that receives saved cards.
    pub album: String,
    /// Wait before capturing when the background is still loading (native).
    pub capture_delay_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            downloads_dir: PathBuf::from("."),
            gallery_dir: None,
            album: "QuoteGenerator".to_string(),
            capture_delay_ms: 100,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Quote service base URL, preferring the environment variable.
    #[must_use]
    pub fn quote_url(&self) -> String {
        std::env::var("QUOTECARD_QUOTE_URL")
            .ok()
            .or_else(|| self.sources.quote_url.clone())
            .unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string())
    }

    /// Photo endpoint, preferring the environment variable.
    #[must_use]
    pub fn photo_url(&self) -> String {
        std::env::var("QUOTECARD_PHOTO_URL")
            .ok()
            .or_else(|| self.sources.photo_url.clone())
            .unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string())
    }

    /// Native cache directory: configured, else `$HOME/.cache/quotecard`.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(|| home_or_cwd(".cache/quotecard"))
    }

    /// Native media library root: configured, else `$HOME/Pictures`.
    #[must_use]
    pub fn gallery_dir(&self) -> PathBuf {
        self.export.gallery_dir.clone().unwrap_or_else(|| home_or_cwd("Pictures"))
    }
}

fn home_or_cwd(relative: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(relative),
        Err(_) => PathBuf::from(relative),
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `QUOTECARD_CONFIG` environment variable
/// 3. `~/.config/quotecard/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("QUOTECARD_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/quotecard/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/quotecard/config.toml")
    } else {
        PathBuf::from("quotecard.toml")
    }
}
