//! Read-side queries over a [`RaceStore`], one per served route shape.

use f1results_api::RaceResult;

use crate::aggregate::{
    self, DriverRaceResult, DriverStanding, RaceWinner, TeamRaceBreakdown, TeamStanding,
};
use crate::store::{RaceFilter, RaceStore, StoreError};

pub struct RaceQueries<'a, S: RaceStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RaceStore + ?Sized> RaceQueries<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Winners of each race in `year`, in race-date order.
    pub fn races(&self, year: i32) -> Result<Vec<RaceWinner>, StoreError> {
        let winners = self.store.find(&RaceFilter::year(year).with_pos(1))?;
        Ok(aggregate::race_winners(&winners))
    }

    pub fn drivers(&self, year: i32) -> Result<Vec<DriverStanding>, StoreError> {
        let season = self.store.find(&RaceFilter::year(year))?;
        Ok(aggregate::driver_standings(&season))
    }

    pub fn teams(&self, year: i32) -> Result<Vec<TeamStanding>, StoreError> {
        self.store.team_points(year)
    }

    /// Raw records of one race.
    pub fn race_results(&self, year: i32, race_name: &str) -> Result<Vec<RaceResult>, StoreError> {
        self.store
            .find(&RaceFilter::year(year).with_race_name(race_name))
    }

    /// Results of one driver. Falls back to a match ignoring edge spaces
    /// when the exact name has no rows.
    pub fn driver_results(
        &self,
        year: i32,
        driver: &str,
    ) -> Result<Vec<DriverRaceResult>, StoreError> {
        let rows = self.find_by_name(year, driver, RaceFilter::with_driver, |r| &r.driver)?;
        Ok(aggregate::driver_race_results(&rows))
    }

    /// Per-race points of one team, with the same edge-space fallback as
    /// [`driver_results`](Self::driver_results).
    pub fn team_results(
        &self,
        year: i32,
        team: &str,
    ) -> Result<Vec<TeamRaceBreakdown>, StoreError> {
        let rows = self.find_by_name(year, team, RaceFilter::with_team, |r| &r.team)?;
        Ok(aggregate::team_race_breakdown(&rows))
    }

    fn find_by_name(
        &self,
        year: i32,
        name: &str,
        filter: fn(RaceFilter, &str) -> RaceFilter,
        field: fn(&RaceResult) -> &String,
    ) -> Result<Vec<RaceResult>, StoreError> {
        let exact = self.store.find(&filter(RaceFilter::year(year), name))?;
        if !exact.is_empty() {
            return Ok(exact);
        }
        let wanted = name.trim();
        let mut season = self.store.find(&RaceFilter::year(year))?;
        season.retain(|r| field(r).trim() == wanted);
        Ok(season)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn rr(race: &str, date: &str, driver: &str, team: &str, pos: u32, point: i64) -> RaceResult {
        RaceResult {
            race_name: race.to_string(),
            year: 1955,
            date: Some(date.to_string()),
            driver: driver.to_string(),
            team: team.to_string(),
            laps: 80,
            time: "2:00:00".to_string(),
            point,
            pos,
            no: 1,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::with_records(vec![
            rr("Belgium", "05 Jun 1955", "Juan Manuel Fangio", "Mercedes", 1, 9),
            rr("Belgium", "05 Jun 1955", "Stirling Moss", "Mercedes", 2, 6),
            rr("Monaco", "22 May 1955", "Maurice Trintignant", "Ferrari", 1, 8),
            rr("Monaco", "22 May 1955", "Eugenio Castellotti", "Lancia", 2, 6),
            rr("Monaco", "22 May 1955", "Jean Behra", "Maserati", 3, 0),
            rr("Argentina", "16 Jan 1955", "Juan Manuel Fangio", "Mercedes", 1, 9),
        ])
    }

    #[test]
    fn races_are_winners_in_date_order() {
        let store = store();
        let q = RaceQueries::new(&store);
        let races = q.races(1955).unwrap();
        let gps: Vec<&str> = races.iter().map(|r| r.grand_prix.as_str()).collect();
        assert_eq!(gps, vec!["Argentina", "Monaco", "Belgium"]);
        assert_eq!(races[1].winner, "Maurice Trintignant");
        assert_eq!(races[1].car, "Ferrari");
    }

    #[test]
    fn standings_and_breakdowns() {
        let store = store();
        let q = RaceQueries::new(&store);

        let drivers = q.drivers(1955).unwrap();
        assert_eq!(drivers[0].driver, "Juan Manuel Fangio");
        assert_eq!(drivers[0].points, 18);

        let teams = q.teams(1955).unwrap();
        let names: Vec<&str> = teams.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["Mercedes", "Ferrari", "Lancia"]);
        assert_eq!(teams[0].points, 24);

        let mercedes = q.team_results(1955, "Mercedes").unwrap();
        assert_eq!(mercedes.len(), 2);
        assert_eq!(mercedes[0].grand_prix, "Belgium");
        assert_eq!(mercedes[0].point, 15);

        let fangio = q.driver_results(1955, "Juan Manuel Fangio").unwrap();
        assert_eq!(fangio.len(), 2);
        assert!(fangio.iter().all(|r| r.date == 1955 && r.pos == 1));
    }

    #[test]
    fn edge_space_names_match_either_way() {
        let mut records = store().records().to_vec();
        records.push(rr("Monaco", "22 May 1955", " Hulkenberg", "Haas ", 4, 3));
        let store = MemoryStore::with_records(records);
        let q = RaceQueries::new(&store);

        let exact = q.driver_results(1955, " Hulkenberg").unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].grand_prix, "Monaco");
        assert_eq!(exact[0].point, 3);
        assert_eq!(q.driver_results(1955, "Hulkenberg").unwrap(), exact);

        assert_eq!(q.team_results(1955, "Haas").unwrap().len(), 1);
        assert_eq!(q.team_results(1955, "Haas ").unwrap().len(), 1);
        assert!(q.driver_results(1955, " Schumacher").unwrap().is_empty());
    }

    #[test]
    fn unknown_names_and_years_are_empty() {
        let store = store();
        let q = RaceQueries::new(&store);
        assert!(q.race_results(1955, "Narnia").unwrap().is_empty());
        assert!(q.races(1999).unwrap().is_empty());
        assert!(q.teams(1999).unwrap().is_empty());
        assert_eq!(q.race_results(1955, "Monaco").unwrap().len(), 3);
    }
}
