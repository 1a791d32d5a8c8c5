use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

const RESULTS_TABLE_ROWS: &str = "table.resultsarchive-table tbody tr";

/// A record field a column can feed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RaceName,
    Href,
    Date,
    Pos,
    No,
    Driver,
    Team,
    Laps,
    Time,
    Point,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::RaceName => "race_name",
            Field::Href => "href",
            Field::Date => "date",
            Field::Pos => "pos",
            Field::No => "no",
            Field::Driver => "driver",
            Field::Team => "team",
            Field::Laps => "laps",
            Field::Time => "time",
            Field::Point => "point",
        };
        write!(f, "{}", s)
    }
}

/// How the text of a cell becomes a field value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellParse {
    /// Trimmed text of the whole cell.
    Text,
    /// Trimmed text of the first anchor in the cell.
    LinkText,
    /// `href` attribute of the first anchor in the cell.
    LinkHref,
    /// Leading integer of the cell text; anything unparsable becomes 0.
    Integer,
    /// Two responsive renderings of a name, joined by one space.
    NameSpans { short: String, long: String },
}

/// How [`CellParse::NameSpans`] output is finalised.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    /// `short + " " + long`, exactly as the archive renders it. An empty span
    /// leaves a stray space at the edge of the name.
    #[default]
    Preserve,
    /// Collapse runs of whitespace and trim.
    Normalize,
}

impl std::str::FromStr for NameStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "normalize" | "normalise" => Ok(Self::Normalize),
            other => Err(format!(
                "unknown name style '{}', expected preserve or normalize",
                other
            )),
        }
    }
}

/// One positional rule: read `field` from the `column`-th element child of a
/// row (1-based, same numbering as `td:nth-child(n)`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub field: Field,
    pub column: usize,
    pub parse: CellParse,
}

impl ColumnRule {
    pub fn new(field: Field, column: usize, parse: CellParse) -> Self {
        Self {
            field,
            column,
            parse,
        }
    }
}

/// A versioned table layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub version: String,
    pub row_selector: String,
    #[serde(default)]
    pub name_style: NameStyle,
    pub rules: Vec<ColumnRule>,
}

impl ColumnSpec {
    /// Layout of a season index page: one row per race.
    pub fn season_index() -> Self {
        Self {
            version: "archive-2023/index".to_string(),
            row_selector: RESULTS_TABLE_ROWS.to_string(),
            name_style: NameStyle::Preserve,
            rules: vec![
                ColumnRule::new(Field::RaceName, 2, CellParse::LinkText),
                ColumnRule::new(Field::Href, 2, CellParse::LinkHref),
                ColumnRule::new(Field::Date, 3, CellParse::Text),
            ],
        }
    }

    /// Layout of a race detail page: one row per classified driver.
    pub fn race_detail() -> Self {
        Self {
            version: "archive-2023/race".to_string(),
            row_selector: RESULTS_TABLE_ROWS.to_string(),
            name_style: NameStyle::Preserve,
            rules: vec![
                ColumnRule::new(Field::Pos, 2, CellParse::Integer),
                ColumnRule::new(Field::No, 3, CellParse::Integer),
                ColumnRule::new(
                    Field::Driver,
                    4,
                    CellParse::NameSpans {
                        short: ".hide-for-tablet".to_string(),
                        long: ".hide-for-mobile".to_string(),
                    },
                ),
                ColumnRule::new(Field::Team, 5, CellParse::Text),
                ColumnRule::new(Field::Laps, 6, CellParse::Integer),
                ColumnRule::new(Field::Time, 7, CellParse::Text),
                ColumnRule::new(Field::Point, 8, CellParse::Integer),
            ],
        }
    }

    pub fn with_name_style(mut self, style: NameStyle) -> Self {
        self.name_style = style;
        self
    }

    /// Parses a layout from TOML and checks its column numbers.
    pub fn from_toml_str(input: &str) -> Result<Self, Error> {
        let spec: ColumnSpec =
            toml::from_str(input).map_err(|e| Error::Layout(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn to_toml_string(&self) -> Result<String, Error> {
        toml::to_string(self).map_err(|e| Error::Layout(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.row_selector.trim().is_empty() {
            return Err(Error::Layout(format!(
                "layout {} has an empty row selector",
                self.version
            )));
        }
        if let Some(rule) = self.rules.iter().find(|r| r.column == 0) {
            return Err(Error::Layout(format!(
                "layout {}: column numbers start at 1 (field {})",
                self.version, rule.field
            )));
        }
        Ok(())
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.rules.iter().any(|r| r.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_detail_layout_survives_toml() {
        let spec = ColumnSpec::race_detail();
        let text = spec.to_toml_string().unwrap();
        let back = ColumnSpec::from_toml_str(&text).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn hand_written_layout_parses() {
        let text = r#"
version = "custom/index"
row_selector = "table.results tr"

[[rules]]
field = "race_name"
column = 1
parse = { kind = "link_text" }

[[rules]]
field = "href"
column = 1
parse = { kind = "link_href" }
"#;
        let spec = ColumnSpec::from_toml_str(text).unwrap();
        assert_eq!(spec.name_style, NameStyle::Preserve);
        assert_eq!(spec.rules.len(), 2);
        assert!(spec.has_field(Field::Href));
        assert!(!spec.has_field(Field::Date));
    }

    #[test]
    fn zero_column_is_rejected() {
        let mut spec = ColumnSpec::season_index();
        spec.rules[0].column = 0;
        assert!(matches!(spec.validate(), Err(Error::Layout(_))));
    }

    #[test]
    fn name_style_from_str() {
        assert_eq!("Normalize".parse::<NameStyle>(), Ok(NameStyle::Normalize));
        assert_eq!("preserve".parse::<NameStyle>(), Ok(NameStyle::Preserve));
        assert!("squash".parse::<NameStyle>().is_err());
    }
}
