use serde::{Deserialize, Serialize};

use crate::extract::RawRow;
use crate::layout::Field;

use super::RaceLink;

/// One row of one race's classification.
///
/// Identity of the race is `(year, race_name)`; `no` only identifies a driver
/// within that race.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub race_name: String,
    pub year: i32,
    #[serde(default)]
    pub date: Option<String>,
    pub driver: String,
    pub team: String,
    pub laps: u32,
    pub time: String,
    pub point: i64,
    /// Classification position, 0 for unclassified entries (DNF, NC, DSQ).
    pub pos: u32,
    pub no: i64,
}

impl RaceResult {
    /// Lifts a race detail row, tagging it with the race it came from.
    pub fn from_row(row: &RawRow, race: &RaceLink, year: i32) -> Self {
        Self {
            race_name: race.race_name.clone(),
            year,
            date: race.date.clone(),
            driver: row.text(Field::Driver).to_string(),
            team: row.text(Field::Team).to_string(),
            laps: non_negative(row.int(Field::Laps)),
            time: row.text(Field::Time).to_string(),
            point: row.int(Field::Point),
            pos: non_negative(row.int(Field::Pos)),
            no: row.int(Field::No),
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pos == 1
    }
}

fn non_negative(n: i64) -> u32 {
    u32::try_from(n).unwrap_or(0)
}
