use std::ops::RangeInclusive;

use chrono::{Datelike, Utc};

use f1results_api::NameStyle;

use crate::error::F1ResultsError;
use crate::store::WriteMode;

/// First season of the world championship.
pub const FIRST_SEASON: i32 = 1950;

pub const MAX_NAME_LENGTH: usize = 100;

/// The season currently running, by calendar year.
pub fn current_season() -> i32 {
    Utc::now().year()
}

/// Validate a season year: 1950 through the current season.
pub fn validate_year(year: i32) -> Result<i32, F1ResultsError> {
    let last = current_season();
    if !(FIRST_SEASON..=last).contains(&year) {
        return Err(F1ResultsError::InvalidInput(format!(
            "season {} is outside {}..={}",
            year, FIRST_SEASON, last
        )));
    }
    Ok(year)
}

/// Validate a scrape range: both ends valid seasons, start not after end.
pub fn validate_year_range(start: i32, end: i32) -> Result<RangeInclusive<i32>, F1ResultsError> {
    validate_year(start)?;
    validate_year(end)?;
    if start > end {
        return Err(F1ResultsError::InvalidInput(format!(
            "start season {} is after end season {}",
            start, end
        )));
    }
    Ok(start..=end)
}

/// Parse a year from a path segment or flag. Returns `None` for anything that
/// is not an integer; callers answer such queries with an empty result.
pub fn parse_year(input: &str) -> Option<i32> {
    input.trim().parse::<i32>().ok()
}

/// Validate a race, driver or team name.
///
/// Control characters are stripped but whitespace, edge spaces included, is
/// kept: stored driver names can carry the archive's span-joining spaces.
pub fn validate_name(input: &str) -> Result<String, F1ResultsError> {
    if input.len() > MAX_NAME_LENGTH {
        return Err(F1ResultsError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            MAX_NAME_LENGTH
        )));
    }
    let stripped: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect();
    if stripped.trim().is_empty() {
        return Err(F1ResultsError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(stripped)
}

/// Parse `append` / `refresh`, case-insensitive.
pub fn parse_write_mode(input: &str) -> Result<WriteMode, F1ResultsError> {
    input.parse::<WriteMode>().map_err(F1ResultsError::InvalidInput)
}

/// Parse `preserve` / `normalize`, case-insensitive.
pub fn parse_name_style(input: &str) -> Result<NameStyle, F1ResultsError> {
    input.parse::<NameStyle>().map_err(F1ResultsError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_bounds() {
        assert!(validate_year(1950).is_ok());
        assert!(validate_year(current_season()).is_ok());
        assert!(validate_year(1949).is_err());
        assert!(validate_year(current_season() + 1).is_err());
    }

    #[test]
    fn year_range_ordering() {
        assert_eq!(validate_year_range(1950, 1955).unwrap(), 1950..=1955);
        assert_eq!(validate_year_range(2000, 2000).unwrap(), 2000..=2000);
        assert!(validate_year_range(1960, 1955).is_err());
        assert!(validate_year_range(1940, 1955).is_err());
    }

    #[test]
    fn parse_year_rejects_text() {
        assert_eq!(parse_year("2023"), Some(2023));
        assert_eq!(parse_year(" 1955 "), Some(1955));
        assert_eq!(parse_year("abc"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn name_keeps_edge_spaces() {
        assert_eq!(validate_name("Monaco\t").unwrap(), "Monaco");
        assert_eq!(validate_name(" Hulkenberg").unwrap(), " Hulkenberg");
        assert_eq!(validate_name("Max  Verstappen").unwrap(), "Max  Verstappen");
        assert_eq!(validate_name("Nico\u{7}Rosberg ").unwrap(), "NicoRosberg ");
    }

    #[test]
    fn name_empty_or_too_long() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("\t\r\n").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn write_mode_and_name_style() {
        assert_eq!(parse_write_mode("Refresh").unwrap(), WriteMode::Refresh);
        assert!(matches!(
            parse_write_mode("overwrite"),
            Err(F1ResultsError::InvalidInput(_))
        ));
        assert_eq!(parse_name_style("normalize").unwrap(), NameStyle::Normalize);
        assert!(parse_name_style("fancy").is_err());
    }
}
