//! Stats provider endpoints and URL building utilities

use reqwest::Url;

/// Provider endpoints used by the service. Each one names its path and the
/// result set the normalizers read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    PlayerCareerStats,
    PlayerGameLog,
    LeagueDashTeamStats,
    LeagueStandings,
    LeagueLeaders,
    CommonAllPlayers,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::PlayerCareerStats => "playercareerstats",
            Endpoint::PlayerGameLog => "playergamelog",
            Endpoint::LeagueDashTeamStats => "leaguedashteamstats",
            Endpoint::LeagueStandings => "leaguestandingsv3",
            Endpoint::LeagueLeaders => "leagueleaders",
            Endpoint::CommonAllPlayers => "commonallplayers",
        }
    }

    /// Name of the result set to read. `None` means the first (or only) one.
    pub fn result_set(&self) -> Option<&'static str> {
        match self {
            Endpoint::PlayerCareerStats => Some("SeasonTotalsRegularSeason"),
            _ => None,
        }
    }

    /// Whether this is one of the league-wide calls the provider throttles hardest.
    pub fn is_heavy(&self) -> bool {
        matches!(
            self,
            Endpoint::LeagueDashTeamStats | Endpoint::LeagueStandings
        )
    }
}

/// Query parameters for one endpoint call, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub fn player_career_params(player_id: i64) -> QueryParams {
    QueryParams::new()
        .with("PlayerID", player_id)
        .with("PerMode", "PerGame")
        .with("LeagueID", "00")
}

pub fn player_game_log_params(player_id: i64, season: &str) -> QueryParams {
    QueryParams::new()
        .with("PlayerID", player_id)
        .with("Season", season)
        .with("SeasonType", "Regular Season")
        .with("LeagueID", "00")
}

pub fn team_stats_params(season: &str) -> QueryParams {
    QueryParams::new()
        .with("Season", season)
        .with("SeasonType", "Regular Season")
        .with("PerMode", "PerGame")
        .with("MeasureType", "Base")
        .with("LeagueID", "00")
}

pub fn standings_params(season: &str) -> QueryParams {
    QueryParams::new()
        .with("LeagueID", "00")
        .with("Season", season)
        .with("SeasonType", "Regular Season")
}

pub fn league_leaders_params(season: &str) -> QueryParams {
    QueryParams::new()
        .with("LeagueID", "00")
        .with("PerMode", "PerGame")
        .with("Scope", "S")
        .with("Season", season)
        .with("SeasonType", "Regular Season")
        .with("StatCategory", "PTS")
}

pub fn all_players_params(season: &str) -> QueryParams {
    QueryParams::new()
        .with("LeagueID", "00")
        .with("Season", season)
        .with("IsOnlyCurrentSeason", 0)
}

/// Builds the full request URL for an endpoint call.
///
/// # Example
/// ```
/// use courtside::data_fetcher::api::{Endpoint, build_endpoint_url, standings_params};
///
/// let url = build_endpoint_url(
///     "https://stats.example.com/stats",
///     Endpoint::LeagueStandings,
///     &standings_params("2025-26"),
/// )
/// .unwrap();
/// assert_eq!(
///     url,
///     "https://stats.example.com/stats/leaguestandingsv3?LeagueID=00&Season=2025-26&SeasonType=Regular+Season"
/// );
/// ```
pub fn build_endpoint_url(
    api_domain: &str,
    endpoint: Endpoint,
    params: &QueryParams,
) -> Result<String, String> {
    let base = format!("{}/{}", api_domain.trim_end_matches('/'), endpoint.path());
    Url::parse_with_params(&base, params.iter())
        .map(String::from)
        .map_err(|e| format!("invalid URL '{base}': {e}"))
}

/// Builds the injury report document URL for one publication slot.
///
/// # Example
/// ```
/// use courtside::data_fetcher::api::build_injury_report_url;
///
/// let url = build_injury_report_url("https://reports.example.com/injury", "2026-01-15", "05PM");
/// assert_eq!(url, "https://reports.example.com/injury/Injury-Report_2026-01-15_05PM.pdf");
/// ```
pub fn build_injury_report_url(report_domain: &str, date: &str, slot: &str) -> String {
    format!(
        "{}/Injury-Report_{date}_{slot}.pdf",
        report_domain.trim_end_matches('/')
    )
}
