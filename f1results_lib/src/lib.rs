//! Library layer for the F1 results scraper: season pipeline, storage,
//! standings aggregation, queries, configuration and validation.
//!
//! Wraps the `f1results_api` crate, which knows how to fetch and read the
//! archive pages, with everything needed to turn a range of seasons into a
//! queryable store.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod queries;
pub mod store;
pub mod validation;

pub use f1results_api;
pub use f1results_api::{Client, ColumnSpec, NameStyle, RaceLink, RaceResult};

pub use aggregate::{
    DriverRaceResult, DriverStanding, RaceWinner, TeamRaceBreakdown, TeamStanding,
};
pub use config::ScrapeConfig;
pub use db::Db;
pub use error::F1ResultsError;
pub use pipeline::{ScrapeReport, SeasonOutcome, SeasonPipeline};
pub use queries::RaceQueries;
pub use store::{persist, MemoryStore, PersistSummary, RaceFilter, RaceStore, StoreError, WriteMode};
