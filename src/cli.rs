//! CLI argument parsing with clap.

use clap::Parser;

use crate::platform::PlatformKind;

/// Quote card CLI - overlay a random quote on a random photo and export it.
#[derive(Parser, Debug)]
#[command(name = "quotecard", version, about)]
pub struct Cli {
    /// Topic tag the quote is drawn from.
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Print the available tags and exit.
    #[arg(long)]
    pub list_tags: bool,

    /// Export platform: web (download) or native (gallery album).
    #[arg(short = 'P', long, value_enum)]
    pub platform: Option<PlatformKind>,

    /// Background image URL (a random photo if not specified).
    #[arg(long)]
    pub image_url: Option<String>,

    /// Directory for web downloads.
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Device pixel ratio used when rasterizing.
    #[arg(short, long)]
    pub scale: Option<f32>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unset() {
        let cli = Cli::parse_from(["quotecard"]);
        assert!(cli.tag.is_none());
        assert!(!cli.list_tags);
        assert!(cli.platform.is_none());
        assert!(cli.image_url.is_none());
        assert!(cli.output_dir.is_none());
        assert!(cli.scale.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn all_options() {
        let cli = Cli::parse_from([
            "quotecard",
            "-t",
            "wisdom",
            "-P",
            "native",
            "--image-url",
            "https://example.com/bg.jpg",
            "-o",
            "out",
            "-s",
            "2",
            "--config",
            "qc.toml",
            "-v",
        ]);
        assert_eq!(cli.tag.as_deref(), Some("wisdom"));
        assert_eq!(cli.platform, Some(PlatformKind::Native));
        assert_eq!(cli.image_url.as_deref(), Some("https://example.com/bg.jpg"));
        assert_eq!(cli.output_dir.as_deref(), Some("out"));
        assert_eq!(cli.scale, Some(2.0));
        assert_eq!(cli.config.as_deref(), Some("qc.toml"));
        assert!(cli.verbose);
    }

    #[test]
    fn unknown_platform_rejected() {
        assert!(Cli::try_parse_from(["quotecard", "--platform", "desktop"]).is_err());
    }
}
