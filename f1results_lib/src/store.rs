//! Storage handle for scraped race results.
//!
//! [`RaceStore`] is the one seam between the pipeline/query layers and
//! persistence. [`crate::db::Db`] is the SQLite implementation;
//! [`MemoryStore`] is a vector-backed stand-in for tests.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use f1results_api::RaceResult;

use crate::aggregate::{self, TeamStanding};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Equality filter over stored results. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceFilter {
    pub year: Option<i32>,
    pub race_name: Option<String>,
    pub driver: Option<String>,
    pub team: Option<String>,
    pub pos: Option<u32>,
}

impl RaceFilter {
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn with_race_name(mut self, race_name: &str) -> Self {
        self.race_name = Some(race_name.to_string());
        self
    }

    pub fn with_driver(mut self, driver: &str) -> Self {
        self.driver = Some(driver.to_string());
        self
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }

    pub fn with_pos(mut self, pos: u32) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn matches(&self, record: &RaceResult) -> bool {
        self.year.map_or(true, |y| record.year == y)
            && self
                .race_name
                .as_deref()
                .map_or(true, |n| record.race_name == n)
            && self.driver.as_deref().map_or(true, |d| record.driver == d)
            && self.team.as_deref().map_or(true, |t| record.team == t)
            && self.pos.map_or(true, |p| record.pos == p)
    }
}

/// What a scrape run does with results already in the store.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Insert alongside existing rows. Re-running a scrape duplicates them.
    #[default]
    Append,
    /// Delete the scraped seasons first, then insert.
    Refresh,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "refresh" => Ok(Self::Refresh),
            other => Err(format!(
                "unknown write mode '{}', expected append or refresh",
                other
            )),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

pub trait RaceStore {
    /// Appends `records` in order. Returns the number inserted.
    fn insert_many(&mut self, records: &[RaceResult]) -> Result<usize, StoreError>;

    /// Removes every record whose season falls in `years`. Returns the number removed.
    fn delete_years(&mut self, years: RangeInclusive<i32>) -> Result<usize, StoreError>;

    /// Deletes `years` then inserts `records`. Returns `(deleted, inserted)`.
    fn replace_years(
        &mut self,
        years: RangeInclusive<i32>,
        records: &[RaceResult],
    ) -> Result<(usize, usize), StoreError> {
        let deleted = self.delete_years(years)?;
        let inserted = self.insert_many(records)?;
        Ok((deleted, inserted))
    }

    /// Matching records in insertion order.
    fn find(&self, filter: &RaceFilter) -> Result<Vec<RaceResult>, StoreError>;

    /// Points per team for `year` in first-seen order, teams with a total of
    /// zero or less left out.
    fn team_points(&self, year: i32) -> Result<Vec<TeamStanding>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}

/// Outcome of one bulk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistSummary {
    pub mode: WriteMode,
    pub deleted: usize,
    pub inserted: usize,
}

/// Writes one scrape run's records in a single bulk operation.
pub fn persist<S: RaceStore + ?Sized>(
    store: &mut S,
    records: &[RaceResult],
    years: RangeInclusive<i32>,
    mode: WriteMode,
) -> Result<PersistSummary, StoreError> {
    let (deleted, inserted) = match mode {
        WriteMode::Append => (0, store.insert_many(records)?),
        WriteMode::Refresh => store.replace_years(years, records)?,
    };
    tracing::info!(
        "Persisted {} race results ({} mode, {} removed)",
        inserted,
        mode,
        deleted
    );
    Ok(PersistSummary {
        mode,
        deleted,
        inserted,
    })
}

/// In-memory store. Writes can be switched off to exercise persistence failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<RaceResult>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<RaceResult>) -> Self {
        Self {
            records,
            reject_writes: false,
        }
    }

    /// Makes every later write fail with [`StoreError::Unavailable`].
    pub fn reject_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    pub fn records(&self) -> &[RaceResult] {
        &self.records
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Unavailable("writes rejected".to_string()));
        }
        Ok(())
    }
}

impl RaceStore for MemoryStore {
    fn insert_many(&mut self, records: &[RaceResult]) -> Result<usize, StoreError> {
        self.check_writable()?;
        self.records.extend_from_slice(records);
        Ok(records.len())
    }

    fn delete_years(&mut self, years: RangeInclusive<i32>) -> Result<usize, StoreError> {
        self.check_writable()?;
        let before = self.records.len();
        self.records.retain(|r| !years.contains(&r.year));
        Ok(before - self.records.len())
    }

    fn find(&self, filter: &RaceFilter) -> Result<Vec<RaceResult>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn team_points(&self, year: i32) -> Result<Vec<TeamStanding>, StoreError> {
        let season = self.find(&RaceFilter::year(year))?;
        Ok(aggregate::team_standings(&season))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rr(year: i32, race: &str, driver: &str, team: &str, pos: u32, point: i64) -> RaceResult {
        RaceResult {
            race_name: race.to_string(),
            year,
            date: None,
            driver: driver.to_string(),
            team: team.to_string(),
            laps: 0,
            time: String::new(),
            point,
            pos,
            no: 0,
        }
    }

    #[test]
    fn filter_matches_on_every_set_field() {
        let r = rr(1955, "Monaco", "Maurice Trintignant", "Ferrari", 1, 8);
        assert!(RaceFilter::default().matches(&r));
        assert!(RaceFilter::year(1955).with_race_name("Monaco").matches(&r));
        assert!(RaceFilter::year(1955).with_pos(1).matches(&r));
        assert!(!RaceFilter::year(1956).matches(&r));
        assert!(!RaceFilter::year(1955).with_team("Mercedes").matches(&r));
        assert!(!RaceFilter::year(1955).with_driver("Juan Manuel Fangio").matches(&r));
    }

    #[test]
    fn append_duplicates_refresh_replaces() {
        let batch = vec![
            rr(1955, "Monaco", "A", "X", 1, 8),
            rr(1956, "Monaco", "B", "Y", 1, 8),
        ];
        let mut store = MemoryStore::new();
        persist(&mut store, &batch, 1955..=1956, WriteMode::Append).unwrap();
        persist(&mut store, &batch, 1955..=1956, WriteMode::Append).unwrap();
        assert_eq!(store.count().unwrap(), 4);

        let summary = persist(&mut store, &batch, 1955..=1956, WriteMode::Refresh).unwrap();
        assert_eq!(summary.deleted, 4);
        assert_eq!(summary.inserted, 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn refresh_keeps_seasons_outside_range() {
        let mut store = MemoryStore::with_records(vec![rr(1950, "Monaco", "A", "X", 1, 8)]);
        let batch = vec![rr(1955, "Monaco", "B", "Y", 1, 8)];
        persist(&mut store, &batch, 1955..=1955, WriteMode::Refresh).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.find(&RaceFilter::year(1950)).unwrap().len(), 1);
    }

    #[test]
    fn rejected_writes_surface_as_errors() {
        let mut store = MemoryStore::new().reject_writes();
        let batch = vec![rr(1955, "Monaco", "A", "X", 1, 8)];
        let err = persist(&mut store, &batch, 1955..=1955, WriteMode::Append).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn write_mode_parsing() {
        assert_eq!("append".parse::<WriteMode>(), Ok(WriteMode::Append));
        assert_eq!(" REFRESH ".parse::<WriteMode>(), Ok(WriteMode::Refresh));
        assert!("upsert".parse::<WriteMode>().is_err());
    }
}
