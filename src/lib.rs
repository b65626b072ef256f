//! NBA statistics aggregation for prop-bet analysis.
//!
//! This library resolves player and team names, fetches season, game-log,
//! standings and leader tables from the stats provider with retries and
//! pacing, reads the league injury report, and assembles all of it into
//! per-request contexts for a language-model analysis gateway.
//!
//! # Examples
//!
//! ```rust,no_run
//! use courtside::data_fetcher::{EntityKind, FetchOutcome, StatsService, current_season};
//! use courtside::{AppError, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let service = StatsService::new(Config::load().await?)?;
//!
//!     let season = current_season();
//!     if let FetchOutcome::Success(team) = service
//!         .resolve_entity(EntityKind::Team, "Denver Nuggets")
//!         .await
//!     {
//!         let record = service.fetch_team_composite(&team, &season).await;
//!         println!("{}", serde_json::to_string_pretty(&record)?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisGateway, ChatSession, OpenAiGateway, PlayerPropContext, PropRequest};
pub use config::Config;
pub use data_fetcher::models::{
    EmptyResult, EntityKind, EntityReference, FetchOutcome, InjuryEntry, StatTable, TeamRecord,
    Unavailable,
};
pub use data_fetcher::{HistoricalDataset, StatsService};
pub use error::AppError;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
