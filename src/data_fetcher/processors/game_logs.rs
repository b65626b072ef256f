//! Player-level normalizers over career tables and season game logs.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::data_fetcher::api::is_standard_season_format;
use crate::data_fetcher::models::{EmptyResult, FetchOutcome, StatRecord, StatTable};

const SEASON_COLUMN: &str = "SEASON_ID";
const MATCHUP_COLUMN: &str = "MATCHUP";
const GAME_DATE_COLUMN: &str = "GAME_DATE";

/// Date layouts seen in game logs, provider format first.
const GAME_DATE_FORMATS: [&str; 3] = ["%b %d, %Y", "%Y-%m-%d", "%Y-%m-%dT%H:%M:%S"];

/// Filters a career table down to one season.
///
/// Zero matching rows is a successful empty table, never `Unavailable`.
pub fn season_rows(career: FetchOutcome<StatTable>, season: &str) -> FetchOutcome<StatTable> {
    career.and_then(|table| {
        if let Err(e) = table.require_column(SEASON_COLUMN) {
            return FetchOutcome::unavailable(e);
        }

        let season = season.trim();
        let filtered = table.filter_rows(|row| row.get_str(SEASON_COLUMN) == Some(season));

        if filtered.is_empty() && !is_standard_season_format(season) {
            warn!("Season '{season}' is not in YYYY-YY form; career filter matched no rows");
        }
        debug!(
            "Season filter kept {} of {} career rows for {season}",
            filtered.len(),
            table.len()
        );
        FetchOutcome::Success(filtered)
    })
}

/// First `n` rows of a reverse-chronological game log. Shorter logs are
/// returned whole.
pub fn last_n_games(log: FetchOutcome<StatTable>, n: usize) -> FetchOutcome<StatTable> {
    log.map(|table| table.head(n))
}

/// Games against `opponent` (a team abbreviation) in a season game log.
///
/// `MATCHUP` reads `DEN vs. LAL` at home and `DEN @ LAL` away; the abbreviation
/// must equal one of its whitespace-separated tokens.
pub fn head_to_head(
    log: FetchOutcome<StatTable>,
    opponent: &str,
    season: &str,
) -> FetchOutcome<StatTable> {
    let opponent = opponent.trim().to_uppercase();
    log.and_then(|table| {
        if let Err(e) = table.require_column(MATCHUP_COLUMN) {
            return FetchOutcome::unavailable(e);
        }

        let games = table.filter_rows(|row| {
            row.get_str(MATCHUP_COLUMN)
                .is_some_and(|matchup| matchup_mentions(matchup, &opponent))
        });

        if games.is_empty() {
            FetchOutcome::Empty(EmptyResult::NoMatchup {
                opponent,
                season: season.to_string(),
            })
        } else {
            FetchOutcome::Success(games)
        }
    })
}

fn matchup_mentions(matchup: &str, abbreviation: &str) -> bool {
    matchup
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case(abbreviation))
}

/// The stat line of the game played on `date`.
pub fn game_on_date(log: FetchOutcome<StatTable>, date: NaiveDate) -> FetchOutcome<StatRecord> {
    log.and_then(|table| {
        if let Err(e) = table.require_column(GAME_DATE_COLUMN) {
            return FetchOutcome::unavailable(e);
        }

        let found = table.iter().find(|row| {
            row.get_str(GAME_DATE_COLUMN)
                .and_then(parse_game_date)
                .is_some_and(|played| played == date)
        });

        match found {
            Some(row) => FetchOutcome::Success(row.to_record()),
            None => FetchOutcome::Empty(EmptyResult::NoGameOnDate {
                date: date.to_string(),
            }),
        }
    })
}

/// Parses a game log date cell. Unparseable cells never match.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let parsed = GAME_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok());
    if parsed.is_none() {
        debug!("Skipping unparseable game date '{raw}'");
    }
    parsed
}
