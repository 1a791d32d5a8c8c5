//! SQLite storage for scraped race results.

use std::ops::RangeInclusive;
use std::path::Path;

use f1results_api::RaceResult;
use rusqlite::{params, Connection, OptionalExtension};

use crate::aggregate::TeamStanding;
use crate::store::{RaceFilter, RaceStore, StoreError};

/// Meta key holding the RFC 3339 time of the last completed scrape.
pub const LAST_SCRAPE_KEY: &str = "last_scrape_at";

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), StoreError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT value FROM scrape_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO scrape_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

fn insert_rows(conn: &Connection, records: &[RaceResult]) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "INSERT INTO race_results
            (race_name, year, date, driver, team, laps, time, point, pos, no)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for r in records {
        stmt.execute(params![
            r.race_name,
            r.year,
            r.date,
            r.driver,
            r.team,
            r.laps,
            r.time,
            r.point,
            r.pos,
            r.no,
        ])?;
    }
    Ok(())
}

impl RaceStore for Db {
    fn insert_many(&mut self, records: &[RaceResult]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        insert_rows(&tx, records)?;
        tx.commit()?;
        Ok(records.len())
    }

    fn delete_years(&mut self, years: RangeInclusive<i32>) -> Result<usize, StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM race_results WHERE year BETWEEN ?1 AND ?2",
            params![years.start(), years.end()],
        )?;
        Ok(removed)
    }

    fn replace_years(
        &mut self,
        years: RangeInclusive<i32>,
        records: &[RaceResult],
    ) -> Result<(usize, usize), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM race_results WHERE year BETWEEN ?1 AND ?2",
            params![years.start(), years.end()],
        )?;
        insert_rows(&tx, records)?;
        tx.commit()?;
        Ok((deleted, records.len()))
    }

    fn find(&self, filter: &RaceFilter) -> Result<Vec<RaceResult>, StoreError> {
        let mut sql = String::from(
            "SELECT race_name, year, date, driver, team, laps, time, point, pos, no
             FROM race_results
             WHERE 1=1",
        );

        let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(year) = filter.year {
            params_vec.push(Box::new(year));
            sql.push_str(&format!(" AND year = ?{}", params_vec.len()));
        }
        if let Some(ref race_name) = filter.race_name {
            params_vec.push(Box::new(race_name.clone()));
            sql.push_str(&format!(" AND race_name = ?{}", params_vec.len()));
        }
        if let Some(ref driver) = filter.driver {
            params_vec.push(Box::new(driver.clone()));
            sql.push_str(&format!(" AND driver = ?{}", params_vec.len()));
        }
        if let Some(ref team) = filter.team {
            params_vec.push(Box::new(team.clone()));
            sql.push_str(&format!(" AND team = ?{}", params_vec.len()));
        }
        if let Some(pos) = filter.pos {
            params_vec.push(Box::new(pos));
            sql.push_str(&format!(" AND pos = ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY id");

        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), |row| {
            Ok(RaceResult {
                race_name: row.get(0)?,
                year: row.get(1)?,
                date: row.get(2)?,
                driver: row.get(3)?,
                team: row.get(4)?,
                laps: row.get(5)?,
                time: row.get(6)?,
                point: row.get(7)?,
                pos: row.get(8)?,
                no: row.get(9)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn team_points(&self, year: i32) -> Result<Vec<TeamStanding>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT team, SUM(point) AS points
             FROM race_results
             WHERE year = ?1
             GROUP BY team
             HAVING SUM(point) > 0
             ORDER BY MIN(id)",
        )?;
        let rows = stmt.query_map(params![year], |row| {
            Ok(TeamStanding {
                team_name: row.get(0)?,
                points: row.get(1)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM race_results", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::store::{persist, WriteMode};

    fn open_test_db() -> Db {
        let db = Db::open_in_memory().expect("open in-memory db");
        db.init().expect("init schema");
        db
    }

    fn rr(year: i32, race: &str, driver: &str, team: &str, pos: u32, point: i64) -> RaceResult {
        RaceResult {
            race_name: race.to_string(),
            year,
            date: Some("22 May 1955".to_string()),
            driver: driver.to_string(),
            team: team.to_string(),
            laps: 100,
            time: "2:58:09.800".to_string(),
            point,
            pos,
            no: 44,
        }
    }

    fn sample() -> Vec<RaceResult> {
        vec![
            rr(1955, "Monaco", "Maurice Trintignant", "Ferrari", 1, 8),
            rr(1955, "Monaco", "Eugenio Castellotti", "Lancia", 2, 6),
            rr(1955, "Monaco", "Jean Behra", "Maserati", 3, 0),
            rr(1955, "Monaco", "Cesare Perdisa", "Maserati", 3, 2),
            rr(1955, "Belgium", "Juan Manuel Fangio", "Mercedes", 1, 9),
            rr(1956, "Monaco", "Stirling Moss", "Maserati", 1, 8),
        ]
    }

    #[test]
    fn init_is_idempotent() {
        let db = open_test_db();
        db.init().expect("second init");
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn insert_and_find_preserve_order_and_fields() {
        let mut db = open_test_db();
        let records = sample();
        assert_eq!(db.insert_many(&records).unwrap(), 6);

        let all = db.find(&RaceFilter::default()).unwrap();
        assert_eq!(all, records);

        let monaco = db
            .find(&RaceFilter::year(1955).with_race_name("Monaco"))
            .unwrap();
        assert_eq!(monaco.len(), 4);
        assert_eq!(monaco[0].driver, "Maurice Trintignant");

        let winners = db.find(&RaceFilter::year(1955).with_pos(1)).unwrap();
        assert_eq!(winners.len(), 2);

        let none = db.find(&RaceFilter::year(1999)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn team_points_match_in_memory_aggregation() {
        let mut db = open_test_db();
        db.insert_many(&sample()).unwrap();

        let from_sql = db.team_points(1955).unwrap();
        let season = db.find(&RaceFilter::year(1955)).unwrap();
        assert_eq!(from_sql, aggregate::team_standings(&season));

        let names: Vec<&str> = from_sql.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["Ferrari", "Lancia", "Maserati", "Mercedes"]);
        assert_eq!(from_sql[2].points, 2);
    }

    #[test]
    fn team_points_drops_zero_totals() {
        let mut db = open_test_db();
        db.insert_many(&[
            rr(1960, "Monaco", "A", "Cooper", 1, 8),
            rr(1960, "Monaco", "B", "Lotus", 7, 0),
        ])
        .unwrap();
        let teams = db.team_points(1960).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_name, "Cooper");
    }

    #[test]
    fn refresh_replaces_only_scraped_years() {
        let mut db = open_test_db();
        let records = sample();
        persist(&mut db, &records, 1955..=1956, WriteMode::Append).unwrap();
        persist(&mut db, &records, 1955..=1956, WriteMode::Append).unwrap();
        assert_eq!(db.count().unwrap(), 12);

        db.insert_many(&[rr(1950, "Britain", "Nino Farina", "Alfa Romeo", 1, 9)])
            .unwrap();
        let summary = persist(&mut db, &records, 1955..=1956, WriteMode::Refresh).unwrap();
        assert_eq!(summary.deleted, 12);
        assert_eq!(summary.inserted, 6);
        assert_eq!(db.count().unwrap(), 7);
        assert_eq!(db.find(&RaceFilter::year(1950)).unwrap().len(), 1);
        assert_eq!(db.find(&RaceFilter::year(1955)).unwrap().len(), 5);
        assert_eq!(db.find(&RaceFilter::year(1956)).unwrap().len(), 1);
    }

    #[test]
    fn meta_roundtrip() {
        let db = open_test_db();
        assert_eq!(db.get_meta(LAST_SCRAPE_KEY).unwrap(), None);
        db.set_meta(LAST_SCRAPE_KEY, "2023-01-01T00:00:00Z").unwrap();
        db.set_meta(LAST_SCRAPE_KEY, "2023-06-01T00:00:00Z").unwrap();
        assert_eq!(
            db.get_meta(LAST_SCRAPE_KEY).unwrap().as_deref(),
            Some("2023-06-01T00:00:00Z")
        );
    }
}
