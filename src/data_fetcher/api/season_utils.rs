//! Season window utilities

use chrono::{Datelike, Local, NaiveDate};

/// First month of a new season. October through December belong to the
/// season that finishes the following calendar year.
const SEASON_START_MONTH: u32 = 10;

/// Current season window as `"YYYY-YY"`, e.g. `"2025-26"`.
pub fn current_season() -> String {
    current_season_with_date(Local::now().date_naive())
}

/// Season window containing `date`. Split out so tests can pin the date.
pub fn current_season_with_date(date: NaiveDate) -> String {
    let start_year = if date.month() >= SEASON_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    };
    format_season(start_year)
}

/// Formats the season that starts in `start_year`.
pub fn format_season(start_year: i32) -> String {
    format!("{start_year}-{:02}", (start_year + 1).rem_euclid(100))
}

/// Whether `season` has the `YYYY-YY` shape with consecutive years.
///
/// Other shapes are still passed to the provider as-is; this is only used to
/// explain empty filter results in the logs.
pub fn is_standard_season_format(season: &str) -> bool {
    let Some((start, end)) = season.split_once('-') else {
        return false;
    };
    if start.len() != 4 || end.len() != 2 {
        return false;
    }
    match (start.parse::<i32>(), end.parse::<i32>()) {
        (Ok(start), Ok(end)) => (start + 1).rem_euclid(100) == end,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_rolls_over_in_october() {
        assert_eq!(current_season_with_date(date(2025, 9, 30)), "2024-25");
        assert_eq!(current_season_with_date(date(2025, 10, 1)), "2025-26");
        assert_eq!(current_season_with_date(date(2025, 12, 31)), "2025-26");
        assert_eq!(current_season_with_date(date(2026, 1, 15)), "2025-26");
    }

    #[test]
    fn test_century_boundary() {
        assert_eq!(format_season(1999), "1999-00");
        assert_eq!(format_season(2009), "2009-10");
    }

    #[test]
    fn test_season_format_check() {
        assert!(is_standard_season_format("2025-26"));
        assert!(is_standard_season_format("1999-00"));
        assert!(!is_standard_season_format("2025-2026"));
        assert!(!is_standard_season_format("2025-27"));
        assert!(!is_standard_season_format("22025"));
        assert!(!is_standard_season_format("abcd-ef"));
    }
}
