//! Positional column layouts for the archive's result tables.
//!
//! A [`ColumnSpec`] says where each record field lives in a table row. The
//! archive renders every table with the same `resultsarchive-table` markup,
//! so changing upstream column order means editing a layout (or loading one
//! from TOML), not the extractor.

mod column;

pub use self::column::{CellParse, ColumnRule, ColumnSpec, Field, NameStyle};
