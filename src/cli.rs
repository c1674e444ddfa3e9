//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use hegre_core::config::{DEFAULT_SUBTITLE_LANGUAGE, split_languages};
use hegre_core::{AssetPlan, Configuration, DEFAULT_MAX_ATTEMPTS, FileConfig, SortOption};

/// Download films, massage and sex education videos and photo galleries
/// from a members account.
///
/// Accepts single item URLs (`/films/<name>`, `/photos/<name>`, ...) as well
/// as collections (`/movies`, `/photos`, `/models/<name>`).
#[derive(Parser, Debug)]
#[command(name = "hegre-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Item or collection URLs to download
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Destination folder (must exist) [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Maximum attempts per file (1-10) [default: 3]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub retries: Option<u8>,

    /// Items downloaded in parallel (1-32) [default: 1]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub parallel: Option<u8>,

    /// Sort order used when crawling collections
    #[arg(short, long, value_enum, default_value_t = SortOption::MostRecent)]
    pub sort: SortOption,

    /// Media resolution to download, e.g. 1080 [default: highest available]
    #[arg(long, value_name = "PIXELS")]
    pub resolution: Option<u32>,

    /// Trailer resolution to download [default: highest available]
    #[arg(long, value_name = "PIXELS")]
    pub trailer_resolution: Option<u32>,

    /// Skip the primary media file
    #[arg(long)]
    pub no_download: bool,

    /// Skip the JSON metadata sidecar
    #[arg(long)]
    pub no_meta: bool,

    /// Skip the cover image
    #[arg(long)]
    pub no_thumb: bool,

    /// Skip subtitles
    #[arg(long)]
    pub no_subtitles: bool,

    /// Comma-separated subtitle languages [default: english]
    #[arg(long, value_name = "LANG[,LANG]")]
    pub subtitles: Option<String>,

    /// Also download the screengrab archive when available
    #[arg(long)]
    pub screengrabs: bool,

    /// Also download the trailer
    #[arg(long)]
    pub trailer: bool,

    /// Archive file recording downloaded items; archived items are skipped
    #[arg(long, value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Config file [default: $XDG_CONFIG_HOME/hegre-downloader/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Account username
    #[arg(long, env = "HEGRE_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    /// Account password
    #[arg(long, env = "HEGRE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Site language cookie
    #[arg(long, default_value = "en")]
    pub locale: String,

    /// Site country cookie
    #[arg(long, default_value = "US")]
    pub country: String,

    /// Site root, for mirrors and testing
    #[arg(long, env = "HEGRE_BASE_URL", hide = true)]
    pub base_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Merges the arguments over `file` and the built-in defaults.
    ///
    /// The result still has to be validated.
    #[must_use]
    pub fn configuration(&self, file: Option<&FileConfig>) -> Configuration {
        let file = file.cloned().unwrap_or_default();
        let defaults = Configuration::default();

        let subtitle_languages = self
            .subtitles
            .as_deref()
            .map(split_languages)
            .or(file.subtitles)
            .filter(|languages| !languages.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_SUBTITLE_LANGUAGE.to_string()]);

        Configuration {
            destination: self
                .destination
                .clone()
                .or(file.destination)
                .unwrap_or(defaults.destination),
            max_attempts: self
                .retries
                .map(u32::from)
                .or(file.retries)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            parallel: self
                .parallel
                .map(usize::from)
                .or(file.parallel)
                .unwrap_or(defaults.parallel),
            sort: self.sort,
            resolution: self.resolution.or(file.resolution),
            trailer_resolution: self.trailer_resolution,
            assets: AssetPlan {
                media: !self.no_download,
                metadata: !self.no_meta,
                thumbnail: !self.no_thumb,
                subtitles: !self.no_subtitles,
                screengrab: self.screengrabs,
                trailer: self.trailer,
            },
            subtitle_languages,
            archive: self.archive.clone().or(file.archive),
        }
    }
}
