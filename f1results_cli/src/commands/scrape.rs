//! The `scrape` subcommand: fetch a range of seasons into SQLite.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use f1results_lib::aggregate::duplicate_winners;
use f1results_lib::db::LAST_SCRAPE_KEY;
use f1results_lib::{validation, RaceFilter, RaceStore, ScrapeConfig, WriteMode};

use crate::commands::open_db;
use crate::output::{build_outcome_rows, emit, OutputFormat};

/// Arguments for the `scrape` subcommand. Unset flags fall back to the
/// `F1RESULTS_*` environment settings.
#[derive(Args, Default)]
pub struct ScrapeArgs {
    /// First season to scrape
    #[arg(long)]
    pub start: Option<i32>,

    /// Last season to scrape (inclusive)
    #[arg(long)]
    pub end: Option<i32>,

    /// append (keep existing rows) or refresh (replace the scraped seasons)
    #[arg(long)]
    pub mode: Option<String>,

    /// Archive root URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// TOML column layout for season index pages
    #[arg(long)]
    pub index_layout: Option<PathBuf>,

    /// TOML column layout for race detail pages
    #[arg(long)]
    pub detail_layout: Option<PathBuf>,

    /// preserve (archive spacing) or normalize (collapse whitespace) driver names
    #[arg(long)]
    pub name_style: Option<String>,
}

impl ScrapeArgs {
    fn apply(&self, mut config: ScrapeConfig) -> Result<ScrapeConfig> {
        if let Some(start) = self.start {
            config.start_year = start;
        }
        if let Some(end) = self.end {
            config.end_year = end;
        }
        if let Some(ref mode) = self.mode {
            config.write_mode = validation::parse_write_mode(mode)?;
        }
        if let Some(ref base_url) = self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = (secs > 0).then(|| std::time::Duration::from_secs(secs));
        }
        if let Some(ref path) = self.index_layout {
            config.index_layout = Some(path.clone());
        }
        if let Some(ref path) = self.detail_layout {
            config.detail_layout = Some(path.clone());
        }
        if let Some(ref style) = self.name_style {
            config.name_style = Some(validation::parse_name_style(style)?);
        }
        Ok(config)
    }
}

pub async fn run(args: &ScrapeArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let config = args.apply(ScrapeConfig::from_env()?)?;
    let years = validation::validate_year_range(config.start_year, config.end_year)?;
    let pipeline = config.build_pipeline()?;

    let mut db = open_db(db_path)?;
    eprintln!(
        "Scraping seasons {}..={} into {} ({} mode)",
        years.start(),
        years.end(),
        db_path.display(),
        config.write_mode
    );

    let (report, summary) = pipeline
        .run_and_persist(&mut db, years.clone(), config.write_mode)
        .await?;
    db.set_meta(LAST_SCRAPE_KEY, &chrono::Utc::now().to_rfc3339())?;

    emit(format, &build_outcome_rows(&report.outcomes), &report.outcomes)?;
    eprintln!(
        "Stored {} results ({} removed first), {} rows in database",
        summary.inserted,
        summary.deleted,
        db.count()?
    );

    if config.write_mode == WriteMode::Append {
        for year in years {
            let winners = db.find(&RaceFilter::year(year).with_pos(1))?;
            for (year, race, count) in duplicate_winners(&winners) {
                eprintln!(
                    "Note: {} {} now lists {} winners; use --mode refresh to replace a season",
                    year, race, count
                );
            }
        }
    }

    let failed = report.failed_seasons();
    if !failed.is_empty() && failed.len() == report.outcomes.len() {
        bail!("every season failed to scrape");
    }
    Ok(())
}
