//! Season-wide queries: `races`, `drivers` and `teams`.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use f1results_lib::validation::parse_year;
use f1results_lib::RaceQueries;

use crate::commands::open_db;
use crate::output::{
    build_driver_standing_rows, build_race_winner_rows, build_team_standing_rows, emit,
    OutputFormat,
};

#[derive(Args)]
pub struct YearArgs {
    /// Season, e.g. 1955. Anything that is not a number yields no rows.
    pub year: String,
}

pub fn run_races(args: &YearArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let db = open_db(db_path)?;
    let winners = match parse_year(&args.year) {
        Some(year) => RaceQueries::new(&db).races(year)?,
        None => Vec::new(),
    };
    emit(format, &build_race_winner_rows(&winners), &winners)
}

pub fn run_drivers(args: &YearArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let db = open_db(db_path)?;
    let standings = match parse_year(&args.year) {
        Some(year) => RaceQueries::new(&db).drivers(year)?,
        None => Vec::new(),
    };
    emit(format, &build_driver_standing_rows(&standings), &standings)
}

pub fn run_teams(args: &YearArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let db = open_db(db_path)?;
    let standings = match parse_year(&args.year) {
        Some(year) => RaceQueries::new(&db).teams(year)?,
        None => Vec::new(),
    };
    emit(format, &build_team_standing_rows(&standings), &standings)
}
