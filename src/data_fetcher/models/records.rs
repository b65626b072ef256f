use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Composite team line built from per-game team stats joined with standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    #[serde(rename = "Team")]
    pub team: String,
    /// Wins-losses, e.g. "10-5"
    #[serde(rename = "Record")]
    pub record: String,
    /// "(playoff rank) in (conference)", e.g. "3 in West"
    #[serde(rename = "Rank")]
    pub rank: String,
    #[serde(rename = "PPG")]
    pub ppg: f64,
    #[serde(rename = "OPP_PPG")]
    pub opp_ppg: f64,
    #[serde(rename = "FG_PCT")]
    pub fg_pct: f64,
    #[serde(rename = "PLUS_MINUS")]
    pub plus_minus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team: String,
    pub record: String,
    pub playoff_rank: i64,
    pub ppg: f64,
    pub opp_ppg: f64,
    pub plus_minus: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConferenceStandings {
    pub east: Vec<StandingsEntry>,
    pub west: Vec<StandingsEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderCategory {
    Points,
    Assists,
    Rebounds,
    Steals,
    Blocks,
}

impl LeaderCategory {
    pub const ALL: [LeaderCategory; 5] = [
        LeaderCategory::Points,
        LeaderCategory::Assists,
        LeaderCategory::Rebounds,
        LeaderCategory::Steals,
        LeaderCategory::Blocks,
    ];

    /// Provider column holding this category's per-game value.
    pub fn column(&self) -> &'static str {
        match self {
            LeaderCategory::Points => "PTS",
            LeaderCategory::Assists => "AST",
            LeaderCategory::Rebounds => "REB",
            LeaderCategory::Steals => "STL",
            LeaderCategory::Blocks => "BLK",
        }
    }
}

impl fmt::Display for LeaderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeaderCategory::Points => "Points",
            LeaderCategory::Assists => "Assists",
            LeaderCategory::Rebounds => "Rebounds",
            LeaderCategory::Steals => "Steals",
            LeaderCategory::Blocks => "Blocks",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub rank: usize,
    pub player: String,
    pub team: String,
    pub value: f64,
}

pub type LeagueLeaders = BTreeMap<LeaderCategory, Vec<LeaderEntry>>;

/// One row of a team's section in the injury report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryEntry {
    pub player: String,
    pub status: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_record_uses_provider_style_keys() {
        let record = TeamRecord {
            team: "Denver Nuggets".into(),
            record: "10-5".into(),
            rank: "3 in West".into(),
            ppg: 115.0,
            opp_ppg: 111.0,
            fg_pct: 0.47,
            plus_minus: 4.0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Team"], "Denver Nuggets");
        assert_eq!(json["OPP_PPG"], 111.0);
        assert_eq!(json["Rank"], "3 in West");
    }

    #[test]
    fn test_leader_category_columns() {
        let columns: Vec<&str> = LeaderCategory::ALL.iter().map(|c| c.column()).collect();
        assert_eq!(columns, vec!["PTS", "AST", "REB", "STL", "BLK"]);
    }
}
