//! Pure normalizers over provider tables. Each takes the upstream
//! `FetchOutcome` and propagates `Unavailable` untouched.

pub mod game_logs;
pub mod team_stats;

pub use game_logs::{game_on_date, head_to_head, last_n_games, parse_game_date, season_rows};
pub use team_stats::{league_leaders, standings_by_conference, team_composite};
