mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "f1results")]
#[command(about = "Scrape Formula 1 race results into SQLite and query them")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// SQLite database path
    #[arg(long, default_value = "f1results.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a range of seasons into the database
    Scrape(commands::scrape::ScrapeArgs),
    /// Winners of each race in a season, by date
    Races(commands::standings::YearArgs),
    /// Driver standings for a season
    Drivers(commands::standings::YearArgs),
    /// Team standings for a season
    Teams(commands::standings::YearArgs),
    /// Every classified row of one race
    RaceResults(commands::results::RaceResultsArgs),
    /// One driver's races in a season
    DriverResults(commands::results::DriverResultsArgs),
    /// One team's points per race in a season
    TeamResults(commands::results::TeamResultsArgs),
    /// Serve the JSON routes over HTTP
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("f1results=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_flag(&cli.output);

    match &cli.command {
        Commands::Scrape(args) => commands::scrape::run(args, &cli.db, &format).await?,
        Commands::Races(args) => commands::standings::run_races(args, &cli.db, &format)?,
        Commands::Drivers(args) => commands::standings::run_drivers(args, &cli.db, &format)?,
        Commands::Teams(args) => commands::standings::run_teams(args, &cli.db, &format)?,
        Commands::RaceResults(args) => commands::results::run_race(args, &cli.db, &format)?,
        Commands::DriverResults(args) => commands::results::run_driver(args, &cli.db, &format)?,
        Commands::TeamResults(args) => commands::results::run_team(args, &cli.db, &format)?,
        Commands::Serve(args) => commands::serve::run(args, &cli.db).await?,
    }

    Ok(())
}
