//! Client for the public Formula 1 results archive.
//!
//! Fetches season index and race detail pages and turns their result tables
//! into typed records using positional column layouts.

mod client;
mod errors;
pub mod extract;
pub mod layout;
pub mod types;
mod user_agent;

pub use self::client::Client;
pub use self::errors::Error;
pub use self::extract::{extract_rows, parse_leading_int, Cell, RawRow};
pub use self::layout::{CellParse, ColumnRule, ColumnSpec, Field, NameStyle};
pub use self::types::{RaceLink, RaceResult};
