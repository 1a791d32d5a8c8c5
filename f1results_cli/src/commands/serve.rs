//! The `serve` subcommand: JSON routes over the local database.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use f1results_cli::server::{self, AppState, ScrapeJob};
use f1results_lib::{validation, ScrapeConfig};

use crate::commands::open_db;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: String,
}

pub async fn run(args: &ServeArgs, db_path: &Path) -> Result<()> {
    let config = ScrapeConfig::from_env()?;
    let years = validation::validate_year_range(config.start_year, config.end_year)?;
    let job = ScrapeJob {
        pipeline: config.build_pipeline()?,
        years,
        mode: config.write_mode,
    };

    let db = open_db(db_path)?;
    eprintln!("Serving {} on {}", db_path.display(), args.bind);
    server::serve(AppState::new(db, job), &args.bind).await?;
    Ok(())
}
