//! Entity resolution: free-text player/team names to provider identifiers.
//!
//! Teams come from the static franchise list, players from the provider's
//! all-players table (loaded once per service). Matching is first-hit in catalog
//! order, see [`matching`].

pub mod matching;
pub mod teams;

use thiserror::Error;
use tracing::debug;

use crate::data_fetcher::models::{EntityKind, EntityReference, StatTable, TeamInfo};
use crate::error::AppError;

pub use matching::{MatchTier, find_first, normalize_name};
pub use teams::{TEAMS, team_by_abbreviation, team_by_id};

/// Zero catalog entries matched. An input problem, not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} '{query}' could not be found")]
pub struct NotFound {
    pub kind: EntityKind,
    pub query: String,
}

impl NotFound {
    fn new(kind: EntityKind, query: &str) -> Self {
        Self {
            kind,
            query: query.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCatalogEntry {
    pub id: i64,
    pub full_name: String,
}

/// Read-only player name catalog in provider order.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    entries: Vec<PlayerCatalogEntry>,
}

impl PlayerCatalog {
    pub fn new(entries: Vec<PlayerCatalogEntry>) -> Self {
        Self { entries }
    }

    /// Builds the catalog from the provider's all-players table
    /// (`PERSON_ID`, `DISPLAY_FIRST_LAST`). Rows without both are skipped.
    pub fn from_table(table: &StatTable) -> Result<Self, AppError> {
        table.require_column("PERSON_ID")?;
        table.require_column("DISPLAY_FIRST_LAST")?;

        let entries: Vec<PlayerCatalogEntry> = table
            .iter()
            .filter_map(|row| {
                Some(PlayerCatalogEntry {
                    id: row.get_i64("PERSON_ID")?,
                    full_name: row.get_str("DISPLAY_FIRST_LAST")?.trim().to_string(),
                })
            })
            .filter(|entry| !entry.full_name.is_empty())
            .collect();

        debug!(
            "Built player catalog with {} of {} rows",
            entries.len(),
            table.len()
        );
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, query: &str) -> Result<EntityReference, NotFound> {
        find_first(&self.entries, query, |entry| [entry.full_name.as_str()])
            .map(|(entry, tier)| {
                debug!("Resolved player '{query}' to '{}' ({tier:?})", entry.full_name);
                EntityReference::player(entry.id, entry.full_name.clone())
            })
            .ok_or_else(|| NotFound::new(EntityKind::Player, query))
    }
}

/// Resolves a team by exact three-letter code, otherwise by full name.
///
/// # Example
/// ```
/// use courtside::data_fetcher::resolver::resolve_team_info;
///
/// assert_eq!(resolve_team_info("nuggets").unwrap().abbreviation, "DEN");
/// assert_eq!(resolve_team_info("BOS").unwrap().full_name, "Boston Celtics");
/// assert!(resolve_team_info("   ").is_err());
/// ```
pub fn resolve_team_info(query: &str) -> Result<&'static TeamInfo, NotFound> {
    if let Some(team) = team_by_abbreviation(query) {
        return Ok(team);
    }
    find_first(&TEAMS, query, |team| [team.full_name])
        .map(|(team, tier)| {
            debug!("Resolved team '{query}' to '{}' ({tier:?})", team.full_name);
            team
        })
        .ok_or_else(|| NotFound::new(EntityKind::Team, query))
}

pub fn resolve_team(query: &str) -> Result<EntityReference, NotFound> {
    resolve_team_info(query).map(TeamInfo::reference)
}
