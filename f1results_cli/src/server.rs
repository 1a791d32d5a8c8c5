//! JSON HTTP routes over a race store.
//!
//! Every handler answers 500 `{"error": "Internal server error"}` on failure
//! and `[]` when the year segment is not a number.

use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use f1results_lib::validation::parse_year;
use f1results_lib::{RaceQueries, RaceStore, SeasonPipeline, StoreError, WriteMode};

/// What `GET /race-results` scrapes and how it writes.
pub struct ScrapeJob {
    pub pipeline: SeasonPipeline,
    pub years: RangeInclusive<i32>,
    pub mode: WriteMode,
}

pub struct AppState<S> {
    pub store: Arc<Mutex<S>>,
    pub scrape: Arc<ScrapeJob>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            scrape: Arc::clone(&self.scrape),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(store: S, scrape: ScrapeJob) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            scrape: Arc::new(scrape),
        }
    }
}

pub fn router<S>(state: AppState<S>) -> Router
where
    S: RaceStore + Send + 'static,
{
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/race-results", get(scrape_all::<S>))
        .route("/races/{year}", get(races::<S>))
        .route("/drivers/{year}", get(drivers::<S>))
        .route("/teams/{year}", get(teams::<S>))
        .route("/race-results/{year}/{race_name}", get(race_results::<S>))
        .route("/driver-results/{year}/{driver_name}", get(driver_results::<S>))
        .route("/team-results/{year}/{team_name}", get(team_results::<S>))
        .with_state(state)
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}

/// Runs a read against the locked store and serialises the answer.
fn answer<S, T, F>(state: &AppState<S>, year: &str, query: F) -> Response
where
    S: RaceStore,
    T: Serialize,
    F: FnOnce(&RaceQueries<'_, S>, i32) -> Result<Vec<T>, StoreError>,
{
    let Some(year) = parse_year(year) else {
        return Json(Vec::<T>::new()).into_response();
    };
    let store = match state.store.lock() {
        Ok(guard) => guard,
        Err(_) => return internal_error(),
    };
    match query(&RaceQueries::new(&*store), year) {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            tracing::error!("Query for {} failed: {}", year, e);
            internal_error()
        }
    }
}

async fn scrape_all<S>(State(state): State<AppState<S>>) -> Response
where
    S: RaceStore + Send + 'static,
{
    let job = &state.scrape;
    let report = match job.pipeline.run(job.years.clone()).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return internal_error();
        }
    };

    let persisted = match state.store.lock() {
        Ok(mut store) => {
            f1results_lib::persist(&mut *store, &report.records, job.years.clone(), job.mode)
        }
        Err(_) => return internal_error(),
    };
    match persisted {
        Ok(_) => Json(report.records).into_response(),
        Err(e) => {
            tracing::error!("Failed to persist scraped results: {}", e);
            internal_error()
        }
    }
}

async fn races<S>(State(state): State<AppState<S>>, Path(year): Path<String>) -> Response
where
    S: RaceStore + Send + 'static,
{
    answer(&state, &year, |q, y| q.races(y))
}

async fn drivers<S>(State(state): State<AppState<S>>, Path(year): Path<String>) -> Response
where
    S: RaceStore + Send + 'static,
{
    answer(&state, &year, |q, y| q.drivers(y))
}

async fn teams<S>(State(state): State<AppState<S>>, Path(year): Path<String>) -> Response
where
    S: RaceStore + Send + 'static,
{
    answer(&state, &year, |q, y| q.teams(y))
}

async fn race_results<S>(
    State(state): State<AppState<S>>,
    Path((year, race_name)): Path<(String, String)>,
) -> Response
where
    S: RaceStore + Send + 'static,
{
    answer(&state, &year, |q, y| q.race_results(y, &race_name))
}

async fn driver_results<S>(
    State(state): State<AppState<S>>,
    Path((year, driver_name)): Path<(String, String)>,
) -> Response
where
    S: RaceStore + Send + 'static,
{
    answer(&state, &year, |q, y| q.driver_results(y, &driver_name))
}

async fn team_results<S>(
    State(state): State<AppState<S>>,
    Path((year, team_name)): Path<(String, String)>,
) -> Response
where
    S: RaceStore + Send + 'static,
{
    answer(&state, &year, |q, y| q.team_results(y, &team_name))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve<S>(state: AppState<S>, addr: &str) -> std::io::Result<()>
where
    S: RaceStore + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
