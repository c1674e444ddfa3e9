//! Run configuration and the optional config file.
//!
//! The config file uses a flat `key = value` syntax with `#` comments:
//!
//! ```text
//! destination = "/srv/media"   # quoted string
//! retries = 5
//! parallel = 4
//! resolution = 1080
//! subtitles = "english,german"
//! archive = "/srv/media/archive.txt"
//! ```
//!
//! Values from the command line win over file values, which win over the
//! built-in defaults.

use std::env;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::download::DEFAULT_MAX_ATTEMPTS;
use crate::model::SortOption;

/// Accepted attempt bounds per file.
pub const RETRIES_RANGE: RangeInclusive<u32> = 1..=10;

/// Accepted worker counts.
pub const PARALLEL_RANGE: RangeInclusive<usize> = 1..=32;

/// Subtitle language downloaded when none is configured.
pub const DEFAULT_SUBTITLE_LANGUAGE: &str = "english";

const CONFIG_DIR_NAME: &str = "hegre-downloader";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Which assets to fetch for each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPlan {
    pub media: bool,
    pub metadata: bool,
    pub thumbnail: bool,
    pub subtitles: bool,
    pub screengrab: bool,
    pub trailer: bool,
}

impl Default for AssetPlan {
    fn default() -> Self {
        Self {
            media: true,
            metadata: true,
            thumbnail: true,
            subtitles: true,
            screengrab: false,
            trailer: false,
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub destination: PathBuf,
    /// Attempts per file, including the first.
    pub max_attempts: u32,
    pub parallel: usize,
    pub sort: SortOption,
    /// Preferred media resolution; highest when unset.
    pub resolution: Option<u32>,
    /// Preferred trailer resolution; highest when unset.
    pub trailer_resolution: Option<u32>,
    pub assets: AssetPlan,
    /// Lower-cased subtitle language labels.
    pub subtitle_languages: Vec<String>,
    pub archive: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("."),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            parallel: 1,
            sort: SortOption::default(),
            resolution: None,
            trailer_resolution: None,
            assets: AssetPlan::default(),
            subtitle_languages: vec![DEFAULT_SUBTITLE_LANGUAGE.to_string()],
            archive: None,
        }
    }
}

impl Configuration {
    /// Checks value ranges and that the destination is an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        check_range("retries", self.max_attempts, &RETRIES_RANGE)?;
        check_range("parallel", self.parallel, &PARALLEL_RANGE)?;
        if !self.destination.is_dir() {
            bail!(
                "{} is not a valid folder!",
                self.destination.display()
            );
        }
        Ok(())
    }
}

/// Values read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub destination: Option<PathBuf>,
    pub retries: Option<u32>,
    pub parallel: Option<usize>,
    pub resolution: Option<u32>,
    pub subtitles: Option<Vec<String>>,
    pub archive: Option<PathBuf>,
}

impl FileConfig {
    /// Validates config values against the command-line constraints.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range key.
    pub fn validate(&self) -> Result<()> {
        if let Some(retries) = self.retries {
            check_range("retries", retries, &RETRIES_RANGE)?;
        }
        if let Some(parallel) = self.parallel {
            check_range("parallel", parallel, &PARALLEL_RANGE)?;
        }
        Ok(())
    }
}

fn check_range<T>(key: &str, value: T, range: &RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if !range.contains(&value) {
        bail!(
            "Invalid value for `{key}`: {value}. Expected range: {}..={}",
            range.start(),
            range.end()
        );
    }
    Ok(())
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/hegre-downloader/config.toml`
/// 2. `$HOME/.config/hegre-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. Without one, the default location is used
/// if a file is present there.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains invalid entries.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.is_file() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "destination" => {
                cfg.destination = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "retries" => {
                let parsed = parse_integer_u64(value).with_context(context)?;
                cfg.retries = Some(u32::try_from(parsed).with_context(context)?);
            }
            "parallel" => {
                let parsed = parse_integer_u64(value).with_context(context)?;
                cfg.parallel = Some(usize::try_from(parsed).with_context(context)?);
            }
            "resolution" => {
                let parsed = parse_integer_u64(value).with_context(context)?;
                cfg.resolution = Some(u32::try_from(parsed).with_context(context)?);
            }
            "subtitles" => {
                let parsed = parse_string_literal(value).with_context(context)?;
                cfg.subtitles = Some(split_languages(&parsed));
            }
            "archive" => {
                cfg.archive = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Splits a comma-separated language list into lower-cased labels.
#[must_use]
pub fn split_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
