//! Season pipeline: scrape a range of seasons concurrently and persist the
//! collected results in one bulk write.
//!
//! Each season runs as its own task. Within a season the index page is
//! fetched first, then every race detail page in index order. A season whose
//! index cannot be fetched is reported as [`SeasonOutcome::Failed`]; a race
//! page that cannot be fetched is skipped and counted. Results reach the
//! shared buffer one whole season at a time.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};

use f1results_api::{extract_rows, Client, ColumnSpec, RaceLink, RaceResult};
use serde::Serialize;
use tokio::task::{Id, JoinError, JoinSet};

use crate::error::F1ResultsError;
use crate::store::{persist, PersistSummary, RaceStore, WriteMode};
use crate::validation::validate_year_range;

/// How one season ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeasonOutcome {
    Done {
        year: i32,
        races: usize,
        skipped_races: usize,
        records: usize,
    },
    Failed {
        year: i32,
        reason: String,
    },
}

impl SeasonOutcome {
    pub fn year(&self) -> i32 {
        match self {
            Self::Done { year, .. } | Self::Failed { year, .. } => *year,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    /// One outcome per requested season, ascending by year.
    pub outcomes: Vec<SeasonOutcome>,
    /// Every collected record, grouped by season in completion order.
    pub records: Vec<RaceResult>,
}

impl ScrapeReport {
    pub fn failed_seasons(&self) -> Vec<i32> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failed())
            .map(SeasonOutcome::year)
            .collect()
    }
}

pub struct SeasonPipeline {
    client: Arc<Client>,
    index_layout: Arc<ColumnSpec>,
    detail_layout: Arc<ColumnSpec>,
}

impl SeasonPipeline {
    /// Pipeline with the built-in archive layouts.
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            index_layout: Arc::new(ColumnSpec::season_index()),
            detail_layout: Arc::new(ColumnSpec::race_detail()),
        }
    }

    /// Pipeline with caller-supplied layouts. Both are checked up front so a
    /// broken selector fails the run instead of every season.
    pub fn with_layouts(
        client: Client,
        index_layout: ColumnSpec,
        detail_layout: ColumnSpec,
    ) -> Result<Self, F1ResultsError> {
        extract_rows("", &index_layout)?;
        extract_rows("", &detail_layout)?;
        Ok(Self {
            client: Arc::new(client),
            index_layout: Arc::new(index_layout),
            detail_layout: Arc::new(detail_layout),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn index_layout(&self) -> &ColumnSpec {
        &self.index_layout
    }

    pub fn detail_layout(&self) -> &ColumnSpec {
        &self.detail_layout
    }

    /// Scrape every season in `years`. Fetch failures and crashed season
    /// tasks never fail the run; they show up in the report's outcomes.
    pub async fn run(&self, years: RangeInclusive<i32>) -> Result<ScrapeReport, F1ResultsError> {
        let years = validate_year_range(*years.start(), *years.end())?;
        tracing::info!(
            "Scraping seasons {}..={} from {}",
            years.start(),
            years.end(),
            self.client.base_url()
        );

        let buffer: Arc<Mutex<Vec<RaceResult>>> = Arc::new(Mutex::new(Vec::new()));
        let mut join_set = JoinSet::new();
        let mut task_years = HashMap::new();

        for year in years {
            let client = Arc::clone(&self.client);
            let index_layout = Arc::clone(&self.index_layout);
            let detail_layout = Arc::clone(&self.detail_layout);
            let buffer = Arc::clone(&buffer);

            let handle = join_set.spawn(async move {
                scrape_season(&client, &index_layout, &detail_layout, year, &buffer).await
            });
            task_years.insert(handle.id(), year);
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = join_set.join_next_with_id().await {
            if let Some(outcome) = joined_outcome(joined, &task_years) {
                outcomes.push(outcome);
            }
        }
        outcomes.sort_by_key(SeasonOutcome::year);

        let records = std::mem::take(&mut *buffer.lock().unwrap_or_else(|e| e.into_inner()));
        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        tracing::info!(
            "Scrape finished: {} records, {} seasons ok, {} failed",
            records.len(),
            outcomes.len() - failed,
            failed
        );

        Ok(ScrapeReport { outcomes, records })
    }

    /// [`run`](Self::run), then write the collected records to `store`.
    pub async fn run_and_persist<S: RaceStore + ?Sized>(
        &self,
        store: &mut S,
        years: RangeInclusive<i32>,
        mode: WriteMode,
    ) -> Result<(ScrapeReport, PersistSummary), F1ResultsError> {
        let report = self.run(years.clone()).await?;
        let summary = persist(store, &report.records, years, mode).map_err(|e| {
            tracing::error!("Failed to persist {} records: {}", report.records.len(), e);
            F1ResultsError::from(e)
        })?;
        Ok((report, summary))
    }
}

/// Turns a finished season task into its outcome. A task that panicked or
/// was cancelled becomes a failed season; `None` only for an unknown task id.
fn joined_outcome(
    joined: Result<(Id, SeasonOutcome), JoinError>,
    task_years: &HashMap<Id, i32>,
) -> Option<SeasonOutcome> {
    match joined {
        Ok((_, outcome)) => Some(outcome),
        Err(e) => {
            let Some(&year) = task_years.get(&e.id()) else {
                tracing::error!("Season task {} failed: {}", e.id(), e);
                return None;
            };
            tracing::warn!("Season {} task failed: {}", year, e);
            Some(SeasonOutcome::Failed {
                year,
                reason: e.to_string(),
            })
        }
    }
}

async fn scrape_season(
    client: &Client,
    index_layout: &ColumnSpec,
    detail_layout: &ColumnSpec,
    year: i32,
    buffer: &Mutex<Vec<RaceResult>>,
) -> SeasonOutcome {
    let index_url = client.season_index_url(year);
    let links = match fetch_race_links(client, index_layout, &index_url).await {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Season {} index failed: {}", year, e);
            return SeasonOutcome::Failed {
                year,
                reason: e.to_string(),
            };
        }
    };
    tracing::debug!("Season {}: {} races listed", year, links.len());

    let mut season_records = Vec::new();
    let mut skipped_races = 0usize;
    for link in &links {
        match fetch_race(client, detail_layout, link, year).await {
            Ok(mut results) => {
                tracing::debug!(
                    "Season {} {}: {} results",
                    year,
                    link.race_name,
                    results.len()
                );
                season_records.append(&mut results);
            }
            Err(e) => {
                tracing::warn!("Season {} race {} failed: {}", year, link.race_name, e);
                skipped_races += 1;
            }
        }
    }

    let records = season_records.len();
    buffer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .extend(season_records);

    tracing::info!(
        "Season {} done: {} races, {} skipped, {} records",
        year,
        links.len(),
        skipped_races,
        records
    );
    SeasonOutcome::Done {
        year,
        races: links.len(),
        skipped_races,
        records,
    }
}

async fn fetch_race_links(
    client: &Client,
    layout: &ColumnSpec,
    url: &str,
) -> Result<Vec<RaceLink>, f1results_api::Error> {
    let html = client.fetch(url).await?;
    let rows = extract_rows(&html, layout)?;
    Ok(rows.iter().filter_map(RaceLink::from_row).collect())
}

async fn fetch_race(
    client: &Client,
    layout: &ColumnSpec,
    link: &RaceLink,
    year: i32,
) -> Result<Vec<RaceResult>, f1results_api::Error> {
    let url = client.resolve(&link.href)?;
    let html = client.fetch(&url).await?;
    let rows = extract_rows(&html, layout)?;
    Ok(rows
        .iter()
        .map(|row| RaceResult::from_row(row, link, year))
        .collect())
}
