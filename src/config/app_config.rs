use std::env;
use std::path::{Path, PathBuf};

use url::Url;

use super::probe_config::{DEFAULT_REPORT_PATH, SuiteConfig};
use crate::error::{Result, SmokeError};

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const CI_ENV: &str = "CI";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Values taken from the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub config_file: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub force_ci: bool,
    pub slow_threshold_ms: Option<u64>,
}

pub struct AppConfig {
    pub base_url: Url,
    pub suite: SuiteConfig,
    pub ci: bool,
    pub report_path: PathBuf,
}

/// Load the application configuration from the command line, the environment and an optional
/// YAML suite file.
/// The base URL is taken from the positional argument, then `BASE_URL`, then the local default.
/// CI mode is enabled by `--ci` or a truthy `CI` variable.
pub fn load_config(overrides: Overrides) -> Result<AppConfig> {
    let env_base_url = env::var(BASE_URL_ENV).ok();
    let raw_base_url = resolve_base_url(overrides.base_url.as_deref(), env_base_url.as_deref());
    let base_url = parse_base_url(&raw_base_url)?;

    let mut suite = match &overrides.config_file {
        Some(path) => read_suite_file(path)?,
        None => SuiteConfig::default(),
    };
    if let Some(threshold) = overrides.slow_threshold_ms {
        suite.slow_threshold_ms = threshold;
    }

    let ci = overrides.force_ci || is_ci(env::var(CI_ENV).ok().as_deref());
    let report_path = overrides
        .report_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH));

    tracing::info!(base_url = %base_url, ci, probes = suite.probes.len(), "Configuration loaded");

    Ok(AppConfig {
        base_url,
        suite,
        ci,
        report_path,
    })
}

/// Pick the first base URL that was actually provided.
pub fn resolve_base_url(arg: Option<&str>, env_value: Option<&str>) -> String {
    arg.or(env_value)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}

/// Parse the base URL, dropping trailing slashes so probe paths join cleanly.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim_end_matches('/');
    Url::parse(trimmed).map_err(|source| SmokeError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })
}

/// CI tooling sets `CI` to all sorts of values; only empty, `0` and `false` mean "no".
pub fn is_ci(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(v) => !v.eq_ignore_ascii_case("false"),
    }
}

pub fn read_suite_file(path: &Path) -> Result<SuiteConfig> {
    let config_str = std::fs::read_to_string(path).map_err(|source| SmokeError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let suite: SuiteConfig =
        serde_yaml::from_str(&config_str).map_err(|source| SmokeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    suite
        .validate()
        .map_err(|reason| SmokeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;
    Ok(suite)
}
