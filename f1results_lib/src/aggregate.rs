//! Standings and per-race aggregations over stored race results.
//!
//! Every function here is pure and expects its input already narrowed to one
//! season (and, for the breakdowns, one team or driver). Grouping keeps keys
//! in first-seen order so output is deterministic for a given input order.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use f1results_api::RaceResult;

/// Date formats seen in the archive's date column.
const DATE_FORMATS: &[&str] = &["%d %b %Y", "%Y-%m-%d", "%d %B %Y"];

/// Summed points for one subject (driver, team or race) and the races that
/// contributed to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedStanding {
    pub subject: String,
    pub total_points: i64,
    pub supporting_races: Vec<String>,
    /// Index into the input of the first record seen for this subject.
    pub first_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceWinner {
    pub grand_prix: String,
    pub date: Option<String>,
    pub winner: String,
    pub car: String,
    pub laps: u32,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStanding {
    pub driver: String,
    pub team: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team_name: String,
    pub points: i64,
}

/// One race of a team's season; `date` carries the season year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRaceBreakdown {
    pub grand_prix: String,
    pub date: i32,
    pub point: i64,
}

/// One race of a driver's season; `date` carries the season year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRaceResult {
    pub grand_prix: String,
    pub date: i32,
    pub car: String,
    pub pos: u32,
    pub point: i64,
}

/// Groups `records` by `key`, summing points, in first-seen key order.
pub fn group_points<F>(records: &[RaceResult], key: F) -> Vec<AggregatedStanding>
where
    F: Fn(&RaceResult) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<AggregatedStanding> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let subject = key(record);
        let slot = *index.entry(subject).or_insert_with(|| {
            groups.push(AggregatedStanding {
                subject: subject.to_string(),
                total_points: 0,
                supporting_races: Vec::new(),
                first_index: i,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.total_points += record.point;
        if !group.supporting_races.contains(&record.race_name) {
            group.supporting_races.push(record.race_name.clone());
        }
    }

    groups
}

pub fn parse_race_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Winners of a season in date order.
///
/// Rows whose date is missing or unparsable keep their stored order and come
/// after every dated row. Two winners for the same race are both returned.
pub fn race_winners(records: &[RaceResult]) -> Vec<RaceWinner> {
    let mut winners: Vec<(Option<NaiveDate>, &RaceResult)> = records
        .iter()
        .filter(|r| r.is_winner())
        .map(|r| (r.date.as_deref().and_then(parse_race_date), r))
        .collect();

    winners.sort_by_key(|(date, _)| (date.is_none(), *date));

    winners
        .into_iter()
        .map(|(_, r)| RaceWinner {
            grand_prix: r.race_name.clone(),
            date: r.date.clone(),
            winner: r.driver.clone(),
            car: r.team.clone(),
            laps: r.laps,
            time: r.time.clone(),
        })
        .collect()
}

/// Races that list more than one winner, as `(year, race_name, count)`.
pub fn duplicate_winners(records: &[RaceResult]) -> Vec<(i32, String, usize)> {
    let mut seen: Vec<(i32, String, usize)> = Vec::new();
    for r in records.iter().filter(|r| r.is_winner()) {
        match seen
            .iter_mut()
            .find(|(y, name, _)| *y == r.year && *name == r.race_name)
        {
            Some(entry) => entry.2 += 1,
            None => seen.push((r.year, r.race_name.clone(), 1)),
        }
    }
    seen.retain(|(_, _, n)| *n > 1);
    seen
}

/// Driver championship table. The team is taken from the driver's first record.
pub fn driver_standings(records: &[RaceResult]) -> Vec<DriverStanding> {
    group_points(records, |r| r.driver.as_str())
        .into_iter()
        .map(|g| DriverStanding {
            team: records[g.first_index].team.clone(),
            driver: g.subject,
            points: g.total_points,
        })
        .collect()
}

/// Constructor table. Teams without a positive total are dropped.
pub fn team_standings(records: &[RaceResult]) -> Vec<TeamStanding> {
    group_points(records, |r| r.team.as_str())
        .into_iter()
        .filter(|g| g.total_points > 0)
        .map(|g| TeamStanding {
            team_name: g.subject,
            points: g.total_points,
        })
        .collect()
}

/// Per-race points of one team; both cars of a race collapse into one entry.
pub fn team_race_breakdown(records: &[RaceResult]) -> Vec<TeamRaceBreakdown> {
    group_points(records, |r| r.race_name.as_str())
        .into_iter()
        .map(|g| TeamRaceBreakdown {
            date: records[g.first_index].year,
            grand_prix: g.subject,
            point: g.total_points,
        })
        .collect()
}

pub fn driver_race_results(records: &[RaceResult]) -> Vec<DriverRaceResult> {
    records
        .iter()
        .map(|r| DriverRaceResult {
            grand_prix: r.race_name.clone(),
            date: r.year,
            car: r.team.clone(),
            pos: r.pos,
            point: r.point,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rr(race: &str, date: Option<&str>, driver: &str, team: &str, pos: u32, point: i64) -> RaceResult {
        RaceResult {
            race_name: race.to_string(),
            year: 2023,
            date: date.map(str::to_string),
            driver: driver.to_string(),
            team: team.to_string(),
            laps: 57,
            time: "1:33:56.736".to_string(),
            point,
            pos,
            no: 1,
        }
    }

    fn season() -> Vec<RaceResult> {
        vec![
            rr("Saudi Arabia", Some("19 Mar 2023"), "Sergio Perez", "Red Bull", 1, 25),
            rr("Saudi Arabia", Some("19 Mar 2023"), "Max Verstappen", "Red Bull", 2, 19),
            rr("Saudi Arabia", Some("19 Mar 2023"), "Kevin Magnussen", "Haas", 13, 0),
            rr("Bahrain", Some("05 Mar 2023"), "Max Verstappen", "Red Bull", 1, 25),
            rr("Bahrain", Some("05 Mar 2023"), "Sergio Perez", "Red Bull", 2, 18),
            rr("Bahrain", Some("05 Mar 2023"), "Fernando Alonso", "Aston Martin", 3, 15),
            rr("Bahrain", Some("05 Mar 2023"), "Kevin Magnussen", "Haas", 0, 0),
        ]
    }

    #[test]
    fn winners_sorted_by_date() {
        let winners = race_winners(&season());
        let races: Vec<&str> = winners.iter().map(|w| w.grand_prix.as_str()).collect();
        assert_eq!(races, vec!["Bahrain", "Saudi Arabia"]);
        assert_eq!(winners[0].winner, "Max Verstappen");
        assert_eq!(winners[0].car, "Red Bull");
        assert_eq!(winners[0].laps, 57);
    }

    #[test]
    fn winners_without_dates_keep_insertion_order_after_dated() {
        let records = vec![
            rr("Monaco", None, "A", "X", 1, 8),
            rr("Spa", Some("18 Jun 1950"), "B", "Y", 1, 8),
            rr("Monza", None, "C", "Z", 1, 8),
            rr("Silverstone", Some("13 May 1950"), "D", "Y", 1, 8),
        ];
        let races: Vec<String> = race_winners(&records).into_iter().map(|w| w.grand_prix).collect();
        assert_eq!(races, vec!["Silverstone", "Spa", "Monaco", "Monza"]);
    }

    #[test]
    fn duplicate_winners_are_surfaced_not_dropped() {
        let mut records = season();
        records.push(rr("Bahrain", Some("05 Mar 2023"), "Lewis Hamilton", "Mercedes", 1, 25));

        let winners = race_winners(&records);
        assert_eq!(winners.iter().filter(|w| w.grand_prix == "Bahrain").count(), 2);
        assert_eq!(duplicate_winners(&records), vec![(2023, "Bahrain".to_string(), 2)]);
        assert!(duplicate_winners(&season()).is_empty());
    }

    #[test]
    fn driver_standings_conserve_points() {
        let records = season();
        let standings = driver_standings(&records);
        let total: i64 = standings.iter().map(|s| s.points).sum();
        let expected: i64 = records.iter().map(|r| r.point).sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn driver_standings_first_seen_order_and_sums() {
        let standings = driver_standings(&season());
        let drivers: Vec<&str> = standings.iter().map(|s| s.driver.as_str()).collect();
        assert_eq!(
            drivers,
            vec!["Sergio Perez", "Max Verstappen", "Kevin Magnussen", "Fernando Alonso"]
        );
        assert_eq!(standings[0].points, 43);
        assert_eq!(standings[1].points, 44);
    }

    #[test]
    fn driver_team_is_first_encountered() {
        let records = vec![
            rr("Bahrain", None, "Nyck de Vries", "AlphaTauri", 15, 0),
            rr("Hungary", None, "Nyck de Vries", "Red Bull", 10, 1),
        ];
        let standings = driver_standings(&records);
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].team, "AlphaTauri");
        assert_eq!(standings[0].points, 1);
    }

    #[test]
    fn team_standings_drop_non_positive_totals() {
        let mut records = season();
        records.push(rr("Bahrain", None, "X1", "X", 9, 0));
        records.push(rr("Bahrain", None, "X2", "X", 10, 0));

        let standings = team_standings(&records);
        assert!(standings.iter().all(|t| t.team_name != "X"));
        assert!(standings.iter().all(|t| t.team_name != "Haas"));
        assert_eq!(
            standings,
            vec![
                TeamStanding { team_name: "Red Bull".to_string(), points: 87 },
                TeamStanding { team_name: "Aston Martin".to_string(), points: 15 },
            ]
        );
    }

    #[test]
    fn team_breakdown_merges_cars_in_same_race() {
        let records = vec![
            rr("Monaco", None, "Driver A", "Alpha", 2, 8),
            rr("Monaco", None, "Driver B", "Alpha", 3, 6),
            rr("Monza", None, "Driver A", "Alpha", 5, 2),
        ];
        let breakdown = team_race_breakdown(&records);
        assert_eq!(
            breakdown,
            vec![
                TeamRaceBreakdown { grand_prix: "Monaco".to_string(), date: 2023, point: 14 },
                TeamRaceBreakdown { grand_prix: "Monza".to_string(), date: 2023, point: 2 },
            ]
        );
    }

    #[test]
    fn group_points_tracks_supporting_races() {
        let groups = group_points(&season(), |r| r.team.as_str());
        let red_bull = groups.iter().find(|g| g.subject == "Red Bull").unwrap();
        assert_eq!(red_bull.supporting_races, vec!["Saudi Arabia", "Bahrain"]);
        assert_eq!(red_bull.first_index, 0);
    }

    #[test]
    fn driver_results_projection() {
        let records = vec![rr("Bahrain", None, "Max Verstappen", "Red Bull", 1, 25)];
        let out = driver_race_results(&records);
        assert_eq!(
            out,
            vec![DriverRaceResult {
                grand_prix: "Bahrain".to_string(),
                date: 2023,
                car: "Red Bull".to_string(),
                pos: 1,
                point: 25,
            }]
        );
    }

    #[test]
    fn empty_input_gives_empty_views() {
        assert!(race_winners(&[]).is_empty());
        assert!(driver_standings(&[]).is_empty());
        assert!(team_standings(&[]).is_empty());
        assert!(team_race_breakdown(&[]).is_empty());
    }

    #[test]
    fn race_dates_parse_in_archive_formats() {
        assert_eq!(parse_race_date("05 Mar 2023"), NaiveDate::from_ymd_opt(2023, 3, 5));
        assert_eq!(parse_race_date("2023-03-05"), NaiveDate::from_ymd_opt(2023, 3, 5));
        assert_eq!(parse_race_date("TBC"), None);
    }
}
