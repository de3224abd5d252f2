//! Quotecard - quote-on-photo card generator.

mod adapters;
mod cache;
mod cassette;
mod cli;
mod config;
mod context;
mod error;
mod output;
mod platform;
mod ports;
mod render;
mod session;
mod state;
mod surface;
mod tags;
mod text;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cache::FileCache;
use crate::cli::Cli;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::CardError;
use crate::platform::{NativePlatform, Platform, PlatformKind, WebPlatform};
use crate::ports::PhotoSource;
use crate::session::Session;
use crate::state::Notice;
use crate::surface::Layout;
use crate::tags::{tag_label, validate_tag, TAGS};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "quotecard=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> Result<(), CardError> {
    if cli.list_tags {
        for tag in TAGS {
            println!("{tag}\t{}", tag_label(tag));
        }
        return Ok(());
    }

    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(CardError::Config)?;

    // Resolve selections
    let tag = cli.tag.clone().unwrap_or_else(|| config.defaults.tag.clone());
    validate_tag(&tag).map_err(CardError::InvalidArgument)?;
    let kind = cli.platform.unwrap_or(config.defaults.platform);
    let layout = Layout {
        width: config.surface.width,
        height: config.surface.height,
        pixel_ratio: cli.scale.unwrap_or(config.surface.pixel_ratio),
    };
    let (width, height) = layout.pixel_size()?;

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("QUOTECARD_REPLAY").ok();
    let is_recording = std::env::var("QUOTECARD_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        if cli.verbose {
            eprintln!("Replaying from: {cassette_path}");
        }
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        if cli.verbose {
            eprintln!("Recording mode enabled");
        }
        let (ctx, session) = ServiceContext::recording(&config);
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config), None)
    };

    let ServiceContext { quotes, photos } = ctx;
    let platform = build_platform(kind, &cli, &config, &photos);
    drop(photos);
    let session = Session::new(quotes, platform, &tag, config.photo_url(), layout);

    if cli.verbose {
        eprintln!("Tag: {} ({tag})", tag_label(&tag));
        eprintln!("Platform: {kind:?}");
    }

    session.select_tag(&tag).await?;
    match session.state().quote {
        Some(quote) if cli.verbose => eprintln!("Quote: \"{}\" - {}", quote.content, quote.author),
        Some(_) => {}
        None => eprintln!("Warning: no quote available, exporting background only"),
    }

    let reference = match cli.image_url.as_deref() {
        Some(url) => session.load_background(url).await,
        None => session.change_background().await,
    };
    if cli.verbose {
        let surface = session.surface();
        eprintln!("Background: {reference}");
        eprintln!(
            "Surface: {width}x{height}, overlay {:?}, export {:?}",
            surface.overlay, surface.export_control
        );
    }

    let notice = session.export().await;
    drop(session);

    // Finish recording if active
    if let Some(recording) = recording_session {
        match recording.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    match notice {
        Some(notice @ Notice::Success(_)) => {
            eprintln!("{}", notice.message());
            Ok(())
        }
        Some(Notice::Failure(message)) => Err(CardError::Capture(message)),
        None => Err(CardError::Capture("Export already in progress".into())),
    }
}

fn build_platform(
    kind: PlatformKind,
    cli: &Cli,
    config: &Config,
    photos: &Arc<dyn PhotoSource>,
) -> Arc<dyn Platform> {
    match kind {
        PlatformKind::Web => {
            let downloads = cli
                .output_dir
                .as_ref()
                .map_or_else(|| config.export.downloads_dir.clone(), PathBuf::from);
            Arc::new(WebPlatform::new(Arc::clone(photos), downloads))
        }
        PlatformKind::Native => {
            let gallery = cli.output_dir.as_ref().map_or_else(|| config.gallery_dir(), PathBuf::from);
            Arc::new(NativePlatform::new(
                Arc::clone(photos),
                FileCache::new(config.cache_dir(), config.cache.max_entries),
                Arc::new(adapters::live::gallery::DirectoryGallery::new(gallery)),
                config.export.album.clone(),
                Duration::from_millis(config.export.capture_delay_ms),
            ))
        }
    }
}
