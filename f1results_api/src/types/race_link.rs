use serde::{Deserialize, Serialize};

use crate::extract::RawRow;
use crate::layout::Field;

/// One race listed on a season index page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceLink {
    pub race_name: String,
    pub href: String,
    /// Only set when the index layout carries a date column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl RaceLink {
    /// Lifts an index row. Rows without a link cannot be followed and yield `None`.
    pub fn from_row(row: &RawRow) -> Option<Self> {
        let href = row.text(Field::Href);
        if href.is_empty() {
            return None;
        }
        let date = match row.get(Field::Date) {
            Some(_) => Some(row.text(Field::Date).to_string()).filter(|d| !d.is_empty()),
            None => None,
        };
        Some(Self {
            race_name: row.text(Field::RaceName).to_string(),
            href: href.to_string(),
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Cell;

    #[test]
    fn row_without_href_is_skipped() {
        let mut row = RawRow::default();
        row.push(Field::RaceName, Cell::Text("Bahrain".to_string()));
        row.push(Field::Href, Cell::Text(String::new()));
        assert!(RaceLink::from_row(&row).is_none());
    }

    #[test]
    fn date_is_optional() {
        let mut row = RawRow::default();
        row.push(Field::RaceName, Cell::Text("Bahrain".to_string()));
        row.push(Field::Href, Cell::Text("/2023/races/1141/bahrain/race-result.html".to_string()));
        let link = RaceLink::from_row(&row).unwrap();
        assert_eq!(link.date, None);

        row.push(Field::Date, Cell::Text("05 Mar 2023".to_string()));
        let link = RaceLink::from_row(&row).unwrap();
        assert_eq!(link.date.as_deref(), Some("05 Mar 2023"));
    }
}
