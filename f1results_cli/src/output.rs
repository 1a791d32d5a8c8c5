use anyhow::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use f1results_lib::{
    DriverRaceResult, DriverStanding, RaceResult, RaceWinner, SeasonOutcome, TeamRaceBreakdown,
    TeamStanding,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    /// Unknown names fall back to a plain table.
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "json" => Self::Json,
            "csv" => Self::Csv,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct RaceWinnerRow {
    #[tabled(rename = "Grand Prix")]
    #[serde(rename = "Grand Prix")]
    grand_prix: String,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Winner")]
    #[serde(rename = "Winner")]
    winner: String,
    #[tabled(rename = "Car")]
    #[serde(rename = "Car")]
    car: String,
    #[tabled(rename = "Laps")]
    #[serde(rename = "Laps")]
    laps: u32,
    #[tabled(rename = "Time")]
    #[serde(rename = "Time")]
    time: String,
}

#[derive(Tabled, Serialize)]
pub struct DriverStandingRow {
    #[tabled(rename = "Pos")]
    #[serde(rename = "Pos")]
    rank: usize,
    #[tabled(rename = "Driver")]
    #[serde(rename = "Driver")]
    driver: String,
    #[tabled(rename = "Team")]
    #[serde(rename = "Team")]
    team: String,
    #[tabled(rename = "Points")]
    #[serde(rename = "Points")]
    points: i64,
}

#[derive(Tabled, Serialize)]
pub struct TeamStandingRow {
    #[tabled(rename = "Pos")]
    #[serde(rename = "Pos")]
    rank: usize,
    #[tabled(rename = "Team")]
    #[serde(rename = "Team")]
    team: String,
    #[tabled(rename = "Points")]
    #[serde(rename = "Points")]
    points: i64,
}

#[derive(Tabled, Serialize)]
pub struct RaceResultRow {
    #[tabled(rename = "Pos")]
    #[serde(rename = "Pos")]
    pos: String,
    #[tabled(rename = "No")]
    #[serde(rename = "No")]
    no: i64,
    #[tabled(rename = "Driver")]
    #[serde(rename = "Driver")]
    driver: String,
    #[tabled(rename = "Team")]
    #[serde(rename = "Team")]
    team: String,
    #[tabled(rename = "Laps")]
    #[serde(rename = "Laps")]
    laps: u32,
    #[tabled(rename = "Time")]
    #[serde(rename = "Time")]
    time: String,
    #[tabled(rename = "Points")]
    #[serde(rename = "Points")]
    points: i64,
}

#[derive(Tabled, Serialize)]
pub struct DriverRaceRow {
    #[tabled(rename = "Grand Prix")]
    #[serde(rename = "Grand Prix")]
    grand_prix: String,
    #[tabled(rename = "Season")]
    #[serde(rename = "Season")]
    season: i32,
    #[tabled(rename = "Car")]
    #[serde(rename = "Car")]
    car: String,
    #[tabled(rename = "Pos")]
    #[serde(rename = "Pos")]
    pos: String,
    #[tabled(rename = "Points")]
    #[serde(rename = "Points")]
    points: i64,
}

#[derive(Tabled, Serialize)]
pub struct TeamRaceRow {
    #[tabled(rename = "Grand Prix")]
    #[serde(rename = "Grand Prix")]
    grand_prix: String,
    #[tabled(rename = "Season")]
    #[serde(rename = "Season")]
    season: i32,
    #[tabled(rename = "Points")]
    #[serde(rename = "Points")]
    points: i64,
}

#[derive(Tabled, Serialize)]
pub struct SeasonOutcomeRow {
    #[tabled(rename = "Season")]
    #[serde(rename = "Season")]
    season: i32,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Races")]
    #[serde(rename = "Races")]
    races: usize,
    #[tabled(rename = "Skipped")]
    #[serde(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Records")]
    #[serde(rename = "Records")]
    records: usize,
    #[tabled(rename = "Reason")]
    #[serde(rename = "Reason")]
    reason: String,
}

// -- Row builders --

pub fn build_race_winner_rows(winners: &[RaceWinner]) -> Vec<RaceWinnerRow> {
    winners
        .iter()
        .map(|w| RaceWinnerRow {
            grand_prix: w.grand_prix.clone(),
            date: w.date.clone().unwrap_or_default(),
            winner: w.winner.clone(),
            car: w.car.clone(),
            laps: w.laps,
            time: w.time.clone(),
        })
        .collect()
}

pub fn build_driver_standing_rows(standings: &[DriverStanding]) -> Vec<DriverStandingRow> {
    standings
        .iter()
        .enumerate()
        .map(|(i, d)| DriverStandingRow {
            rank: i + 1,
            driver: d.driver.clone(),
            team: d.team.clone(),
            points: d.points,
        })
        .collect()
}

pub fn build_team_standing_rows(standings: &[TeamStanding]) -> Vec<TeamStandingRow> {
    standings
        .iter()
        .enumerate()
        .map(|(i, t)| TeamStandingRow {
            rank: i + 1,
            team: t.team_name.clone(),
            points: t.points,
        })
        .collect()
}

pub fn build_race_result_rows(results: &[RaceResult]) -> Vec<RaceResultRow> {
    results
        .iter()
        .map(|r| RaceResultRow {
            pos: format_pos(r.pos),
            no: r.no,
            driver: r.driver.clone(),
            team: r.team.clone(),
            laps: r.laps,
            time: r.time.clone(),
            points: r.point,
        })
        .collect()
}

pub fn build_driver_race_rows(results: &[DriverRaceResult]) -> Vec<DriverRaceRow> {
    results
        .iter()
        .map(|r| DriverRaceRow {
            grand_prix: r.grand_prix.clone(),
            season: r.date,
            car: r.car.clone(),
            pos: format_pos(r.pos),
            points: r.point,
        })
        .collect()
}

pub fn build_team_race_rows(results: &[TeamRaceBreakdown]) -> Vec<TeamRaceRow> {
    results
        .iter()
        .map(|r| TeamRaceRow {
            grand_prix: r.grand_prix.clone(),
            season: r.date,
            points: r.point,
        })
        .collect()
}

pub fn build_outcome_rows(outcomes: &[SeasonOutcome]) -> Vec<SeasonOutcomeRow> {
    outcomes
        .iter()
        .map(|o| match o {
            SeasonOutcome::Done {
                year,
                races,
                skipped_races,
                records,
            } => SeasonOutcomeRow {
                season: *year,
                status: "done".to_string(),
                races: *races,
                skipped: *skipped_races,
                records: *records,
                reason: String::new(),
            },
            SeasonOutcome::Failed { year, reason } => SeasonOutcomeRow {
                season: *year,
                status: "failed".to_string(),
                races: 0,
                skipped: 0,
                records: 0,
                reason: reason.clone(),
            },
        })
        .collect()
}

/// Positions the archive does not number ("NC", "DQ", "DNF") are stored as 0.
fn format_pos(pos: u32) -> String {
    if pos == 0 {
        "-".to_string()
    } else {
        pos.to_string()
    }
}

// -- Printing --

pub fn print_table<T: Tabled>(rows: &[T]) {
    println!("{}", Table::new(rows));
}

pub fn print_markdown<T: Tabled>(rows: &[T]) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Prints `rows` in the chosen format. JSON prints `data` instead, so it
/// keeps the same field names as the HTTP routes.
pub fn emit<R, D>(format: &OutputFormat, rows: &[R], data: &D) -> Result<()>
where
    R: Tabled + Serialize,
    D: Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => print_table(rows),
        OutputFormat::Json => print_json(&data),
        OutputFormat::Csv => print_csv(rows)?,
        OutputFormat::Markdown => print_markdown(rows),
    }
    Ok(())
}
