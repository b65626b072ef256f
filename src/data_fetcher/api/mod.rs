pub mod fetch_utils;
pub mod http_client;
pub mod season_utils;
pub mod urls;
mod core;

pub use self::core::StatsService;
pub use fetch_utils::{FetchGateway, FetchPolicy, parse_result_table};
pub use http_client::{browser_headers, create_http_client_with_timeout, create_stats_client};
pub use season_utils::{
    current_season, current_season_with_date, format_season, is_standard_season_format,
};
pub use urls::*;
