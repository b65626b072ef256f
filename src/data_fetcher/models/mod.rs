pub mod entities;
pub mod outcome;
pub mod records;
pub mod table;

pub use entities::{Conference, EntityKind, EntityReference, TeamInfo};
pub use outcome::{EmptyResult, FetchOutcome, Unavailable};
pub use records::{
    ConferenceStandings, InjuryEntry, LeaderCategory, LeaderEntry, LeagueLeaders,
    StandingsEntry, TeamRecord,
};
pub use table::{StatRecord, StatRow, StatTable};
