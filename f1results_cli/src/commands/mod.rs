//! CLI subcommand implementations.

pub mod results;
pub mod scrape;
pub mod serve;
pub mod standings;

use std::path::Path;

use anyhow::Result;
use f1results_lib::Db;

/// Opens the database at `path`, creating the schema if needed.
pub fn open_db(path: &Path) -> Result<Db> {
    let db = Db::open(path)?;
    db.init()?;
    Ok(db)
}
