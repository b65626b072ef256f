//! Application-wide constants and configuration values
//!
//! Centralizes provider endpoints, retry/pacing defaults and environment variable names.

/// Default timeout for stats provider requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Default timeout for a single injury report download attempt in seconds
pub const DEFAULT_INJURY_TIMEOUT_SECONDS: u64 = 10;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 10;

pub const DEFAULT_STATS_API_DOMAIN: &str = "https://stats.nba.com/stats";
pub const DEFAULT_INJURY_REPORT_DOMAIN: &str = "https://ak-static.cms.nba.com/referee/injury";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Retry and pacing policy for the stats provider
pub mod retry {
    /// Attempts per call, including the first one
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Fixed delay between attempts after a read timeout
    pub const RETRY_DELAY_MS: u64 = 2000;

    /// Pause between the league-wide standings and team stats calls
    pub const PACING_DELAY_MS: u64 = 1500;
}

/// In-memory response cache settings
pub mod cache {
    pub const HTTP_RESPONSE_CAPACITY: usize = 100;

    /// TTL for cached stats provider responses (5 minutes)
    pub const HTTP_RESPONSE_SECONDS: u64 = 300;

    pub const INJURY_ANSWER_CAPACITY: usize = 64;
}

/// Injury report discovery window
pub mod injury {
    /// Calendar days searched, today included
    pub const LOOKBACK_DAYS: i64 = 7;

    /// Publication slots tried for each day, latest first
    pub const TIME_SLOTS: [&str; 3] = ["05PM", "01PM", "11AM"];
}

/// Statistical windows used by the normalizers
pub mod windows {
    pub const LAST_N_GAMES: usize = 10;
    pub const LEADERS_TOP_N: usize = 10;
}

/// Chat turn limits
pub mod chat {
    /// Capability invocations allowed per turn before the model must answer
    pub const MAX_CAPABILITY_CALLS: usize = 3;
    pub const HISTORICAL_ROW_LIMIT: usize = 20;
}

/// Environment variable names
pub mod env_vars {
    pub const STATS_API_DOMAIN: &str = "COURTSIDE_STATS_API_DOMAIN";
    pub const INJURY_DOMAIN: &str = "COURTSIDE_INJURY_DOMAIN";
    pub const HTTP_TIMEOUT: &str = "COURTSIDE_HTTP_TIMEOUT";
    pub const DATA_DIR: &str = "COURTSIDE_DATA_DIR";
    pub const LOG_FILE: &str = "COURTSIDE_LOG_FILE";
    pub const LLM_MODEL: &str = "COURTSIDE_LLM_MODEL";
    pub const LLM_API_KEY: &str = "OPENAI_API_KEY";
}
