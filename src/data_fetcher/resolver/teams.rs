//! Static franchise catalog. Team identifiers are stable across seasons.

use crate::data_fetcher::models::Conference::{self, East, West};
use crate::data_fetcher::models::TeamInfo;

const fn team(
    id: i64,
    full_name: &'static str,
    abbreviation: &'static str,
    nickname: &'static str,
    city: &'static str,
    conference: Conference,
) -> TeamInfo {
    TeamInfo {
        id,
        full_name,
        abbreviation,
        nickname,
        city,
        conference,
    }
}

pub static TEAMS: [TeamInfo; 30] = [
    team(1610612737, "Atlanta Hawks", "ATL", "Hawks", "Atlanta", East),
    team(1610612738, "Boston Celtics", "BOS", "Celtics", "Boston", East),
    team(1610612739, "Cleveland Cavaliers", "CLE", "Cavaliers", "Cleveland", East),
    team(1610612740, "New Orleans Pelicans", "NOP", "Pelicans", "New Orleans", West),
    team(1610612741, "Chicago Bulls", "CHI", "Bulls", "Chicago", East),
    team(1610612742, "Dallas Mavericks", "DAL", "Mavericks", "Dallas", West),
    team(1610612743, "Denver Nuggets", "DEN", "Nuggets", "Denver", West),
    team(1610612744, "Golden State Warriors", "GSW", "Warriors", "Golden State", West),
    team(1610612745, "Houston Rockets", "HOU", "Rockets", "Houston", West),
    team(1610612746, "Los Angeles Clippers", "LAC", "Clippers", "Los Angeles", West),
    team(1610612747, "Los Angeles Lakers", "LAL", "Lakers", "Los Angeles", West),
    team(1610612748, "Miami Heat", "MIA", "Heat", "Miami", East),
    team(1610612749, "Milwaukee Bucks", "MIL", "Bucks", "Milwaukee", East),
    team(1610612750, "Minnesota Timberwolves", "MIN", "Timberwolves", "Minnesota", West),
    team(1610612751, "Brooklyn Nets", "BKN", "Nets", "Brooklyn", East),
    team(1610612752, "New York Knicks", "NYK", "Knicks", "New York", East),
    team(1610612753, "Orlando Magic", "ORL", "Magic", "Orlando", East),
    team(1610612754, "Indiana Pacers", "IND", "Pacers", "Indiana", East),
    team(1610612755, "Philadelphia 76ers", "PHI", "76ers", "Philadelphia", East),
    team(1610612756, "Phoenix Suns", "PHX", "Suns", "Phoenix", West),
    team(1610612757, "Portland Trail Blazers", "POR", "Trail Blazers", "Portland", West),
    team(1610612758, "Sacramento Kings", "SAC", "Kings", "Sacramento", West),
    team(1610612759, "San Antonio Spurs", "SAS", "Spurs", "San Antonio", West),
    team(1610612760, "Oklahoma City Thunder", "OKC", "Thunder", "Oklahoma City", West),
    team(1610612761, "Toronto Raptors", "TOR", "Raptors", "Toronto", East),
    team(1610612762, "Utah Jazz", "UTA", "Jazz", "Utah", West),
    team(1610612763, "Memphis Grizzlies", "MEM", "Grizzlies", "Memphis", West),
    team(1610612764, "Washington Wizards", "WAS", "Wizards", "Washington", East),
    team(1610612765, "Detroit Pistons", "DET", "Pistons", "Detroit", East),
    team(1610612766, "Charlotte Hornets", "CHA", "Hornets", "Charlotte", East),
];

pub fn team_by_id(id: i64) -> Option<&'static TeamInfo> {
    TEAMS.iter().find(|t| t.id == id)
}

/// Case-insensitive lookup by three-letter code.
pub fn team_by_abbreviation(abbreviation: &str) -> Option<&'static TeamInfo> {
    let wanted = abbreviation.trim();
    TEAMS
        .iter()
        .find(|t| t.abbreviation.eq_ignore_ascii_case(wanted))
}
