//! Per-race, per-driver and per-team queries.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use f1results_lib::validation::{parse_year, validate_name};
use f1results_lib::RaceQueries;

use crate::commands::open_db;
use crate::output::{
    build_driver_race_rows, build_race_result_rows, build_team_race_rows, emit, OutputFormat,
};

#[derive(Args)]
pub struct RaceResultsArgs {
    /// Season, e.g. 1955
    pub year: String,
    /// Race name as listed on the season index, e.g. "Monaco"
    pub race_name: String,
}

#[derive(Args)]
pub struct DriverResultsArgs {
    /// Season, e.g. 1955
    pub year: String,
    /// Driver name as stored, e.g. "Juan Manuel Fangio"
    pub driver_name: String,
}

#[derive(Args)]
pub struct TeamResultsArgs {
    /// Season, e.g. 1955
    pub year: String,
    /// Team name as stored, e.g. "Mercedes"
    pub team_name: String,
}

pub fn run_race(args: &RaceResultsArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let race_name = validate_name(&args.race_name)?;
    let db = open_db(db_path)?;
    let results = match parse_year(&args.year) {
        Some(year) => RaceQueries::new(&db).race_results(year, &race_name)?,
        None => Vec::new(),
    };
    emit(format, &build_race_result_rows(&results), &results)
}

pub fn run_driver(args: &DriverResultsArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let driver = validate_name(&args.driver_name)?;
    let db = open_db(db_path)?;
    let results = match parse_year(&args.year) {
        Some(year) => RaceQueries::new(&db).driver_results(year, &driver)?,
        None => Vec::new(),
    };
    emit(format, &build_driver_race_rows(&results), &results)
}

pub fn run_team(args: &TeamResultsArgs, db_path: &Path, format: &OutputFormat) -> Result<()> {
    let team = validate_name(&args.team_name)?;
    let db = open_db(db_path)?;
    let results = match parse_year(&args.year) {
        Some(year) => RaceQueries::new(&db).team_results(year, &team)?,
        None => Vec::new(),
    };
    emit(format, &build_team_race_rows(&results), &results)
}
