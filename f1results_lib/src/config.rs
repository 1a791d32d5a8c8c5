//! Scrape settings read from the environment (`.env` is loaded by the binary).

use std::path::{Path, PathBuf};
use std::time::Duration;

use f1results_api::{Client, ColumnSpec, NameStyle};

use crate::error::F1ResultsError;
use crate::pipeline::SeasonPipeline;
use crate::store::WriteMode;
use crate::validation::{parse_name_style, parse_write_mode};

pub const DEFAULT_START_YEAR: i32 = 1950;
pub const DEFAULT_END_YEAR: i32 = 2023;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub start_year: i32,
    pub end_year: i32,
    pub write_mode: WriteMode,
    /// Per-request timeout. `None` leaves the transport default.
    pub timeout: Option<Duration>,
    pub index_layout: Option<PathBuf>,
    pub detail_layout: Option<PathBuf>,
    /// Overrides the detail layout's own name style when set.
    pub name_style: Option<NameStyle>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: Client::DEFAULT_BASE_URL.to_string(),
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            write_mode: WriteMode::Append,
            timeout: None,
            index_layout: None,
            detail_layout: None,
            name_style: None,
        }
    }
}

impl ScrapeConfig {
    /// Reads `F1RESULTS_*` variables. Unparsable years or timeouts fall back
    /// to their defaults; an unknown write mode or name style is an error.
    pub fn from_env() -> Result<Self, F1ResultsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, F1ResultsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let write_mode = match lookup("F1RESULTS_WRITE_MODE") {
            Some(raw) => parse_write_mode(&raw)
                .map_err(|e| F1ResultsError::Config(format!("F1RESULTS_WRITE_MODE: {}", e)))?,
            None => defaults.write_mode,
        };
        let name_style = match lookup("F1RESULTS_NAME_STYLE") {
            Some(raw) => Some(parse_name_style(&raw).map_err(|e| {
                F1ResultsError::Config(format!("F1RESULTS_NAME_STYLE: {}", e))
            })?),
            None => defaults.name_style,
        };

        Ok(Self {
            base_url: lookup("F1RESULTS_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            start_year: env_i32(&lookup, "F1RESULTS_START_YEAR", defaults.start_year),
            end_year: env_i32(&lookup, "F1RESULTS_END_YEAR", defaults.end_year),
            write_mode,
            timeout: lookup("F1RESULTS_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            index_layout: lookup("F1RESULTS_INDEX_LAYOUT").map(PathBuf::from),
            detail_layout: lookup("F1RESULTS_DETAIL_LAYOUT").map(PathBuf::from),
            name_style,
        })
    }

    pub fn client(&self) -> Result<Client, F1ResultsError> {
        Ok(Client::with_options(&self.base_url, self.timeout)?)
    }

    /// Client plus layouts (built-in unless a TOML file is configured). A
    /// configured name style replaces the one the detail layout carries.
    pub fn build_pipeline(&self) -> Result<SeasonPipeline, F1ResultsError> {
        let index = match &self.index_layout {
            Some(path) => load_layout(path)?,
            None => ColumnSpec::season_index(),
        };
        let mut detail = match &self.detail_layout {
            Some(path) => load_layout(path)?,
            None => ColumnSpec::race_detail(),
        };
        if let Some(style) = self.name_style {
            detail = detail.with_name_style(style);
        }
        tracing::debug!(
            "Using layouts {} / {} ({:?} names)",
            index.version,
            detail.version,
            detail.name_style
        );
        SeasonPipeline::with_layouts(self.client()?, index, detail)
    }
}

pub fn load_layout(path: &Path) -> Result<ColumnSpec, F1ResultsError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        F1ResultsError::Config(format!("cannot read layout {}: {}", path.display(), e))
    })?;
    ColumnSpec::from_toml_str(&raw).map_err(|e| {
        F1ResultsError::Config(format!("invalid layout {}: {}", path.display(), e))
    })
}

fn env_i32<F>(lookup: &F, key: &str, default: i32) -> i32
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|val| val.trim().parse::<i32>().ok())
        .unwrap_or(default)
}
