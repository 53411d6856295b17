//! Runtime configuration for the `gold` binary.
//!
//! Resolution order: CLI flag, then environment (including `.env` via
//! `dotenvy`), then built-in default. Only this module reads the environment;
//! the pipeline receives everything explicitly.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::SourceArgs;
use crate::data::DEFAULT_DATA_URL;
use crate::error::AppError;

pub const ENV_DATA_URL: &str = "GOLD_DATA_URL";
pub const ENV_CACHE_TTL_SECS: &str = "GOLD_CACHE_TTL_SECS";
pub const ENV_LOG_FILE: &str = "GOLD_LOG_FILE";

/// Where the price sheet is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub location: DataLocation,
    /// `None` caches for the life of the process.
    pub cache_ttl: Option<Duration>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from CLI flags and the process environment.
    pub fn resolve(args: &SourceArgs) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(
        args: &SourceArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let location = match (&args.file, &args.url) {
            (Some(path), _) => DataLocation::File(path.clone()),
            (None, Some(url)) => DataLocation::Url(url.clone()),
            (None, None) => DataLocation::Url(
                non_empty(env(ENV_DATA_URL)).unwrap_or_else(|| DEFAULT_DATA_URL.to_string()),
            ),
        };

        let ttl_secs = match args.cache_ttl_secs {
            Some(secs) => Some(secs),
            None => match non_empty(env(ENV_CACHE_TTL_SECS)) {
                Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                    AppError::new(2, format!("Invalid {ENV_CACHE_TTL_SECS} '{raw}': expected whole seconds."))
                })?),
                None => None,
            },
        };

        Ok(Self {
            location,
            // 0 means "until restart", same as unset.
            cache_ttl: ttl_secs.filter(|s| *s > 0).map(Duration::from_secs),
            log_file: non_empty(env(ENV_LOG_FILE)).map(PathBuf::from),
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
