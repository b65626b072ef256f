pub mod api;
pub mod cache;
pub mod dataset;
pub mod injuries;
pub mod models;
pub mod processors;
pub mod resolver;

pub use api::{FetchGateway, FetchPolicy, StatsService, current_season};
pub use dataset::HistoricalDataset;
pub use models::{EntityKind, EntityReference, FetchOutcome, StatTable, Unavailable};
