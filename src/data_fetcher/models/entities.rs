use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Team,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Player => write!(f, "Player"),
            EntityKind::Team => write!(f, "Team"),
        }
    }
}

/// A resolved player or team. Built once per request and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    pub kind: EntityKind,
    /// Provider identifier (PERSON_ID / TEAM_ID)
    pub id: i64,
    pub display_name: String,
}

impl EntityReference {
    pub fn player(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Player,
            id,
            display_name: display_name.into(),
        }
    }

    pub fn team(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Team,
            id,
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    /// Parses the provider's conference label ("East", "Eastern", "west", ...).
    pub fn parse(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        if lower.starts_with("east") {
            Some(Conference::East)
        } else if lower.starts_with("west") {
            Some(Conference::West)
        } else {
            None
        }
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conference::East => write!(f, "East"),
            Conference::West => write!(f, "West"),
        }
    }
}

/// Static franchise data for one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamInfo {
    pub id: i64,
    pub full_name: &'static str,
    pub abbreviation: &'static str,
    pub nickname: &'static str,
    pub city: &'static str,
    pub conference: Conference,
}

impl TeamInfo {
    pub fn reference(&self) -> EntityReference {
        EntityReference::team(self.id, self.full_name)
    }
}
