use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args as ClapArgs, Parser, Subcommand};
use courtside::constants::{chat, windows};
use std::path::PathBuf;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// NBA stats, standings and injury reports for prop-bet analysis
///
/// Every data command prints its result as JSON. Results are tagged with an
/// outcome: success, empty (valid but no rows, e.g. no game that day),
/// not_found (the name did not resolve) or unavailable (the provider failed).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Also write logs to the terminal. Without this flag logs only go to the log file.
    #[arg(long = "debug", global = true, help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", global = true, help_heading = "Debug")]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// A player's regular-season averages
    Player {
        name: String,
        /// Season in YYYY-YY form. Defaults to the current season.
        #[arg(long)]
        season: Option<String>,
    },

    /// A player's most recent games
    LastGames {
        name: String,
        #[arg(short = 'n', long, default_value_t = windows::LAST_N_GAMES)]
        n: usize,
        #[arg(long)]
        season: Option<String>,
    },

    /// A player's games against one opponent this season
    HeadToHead {
        name: String,
        /// Opponent abbreviation or name, e.g. LAL
        opponent: String,
        #[arg(long)]
        season: Option<String>,
    },

    /// A team's record, rank and scoring
    Team {
        name: String,
        #[arg(long)]
        season: Option<String>,
    },

    /// League leaders per stat category
    Leaders {
        #[arg(long)]
        season: Option<String>,
    },

    /// Standings split by conference
    Standings {
        #[arg(long)]
        season: Option<String>,
    },

    /// A team's entries in the latest injury report
    Injuries { team: String },

    /// A player's line for the game on one date
    OnDate {
        name: String,
        /// Game date in YYYY-MM-DD format
        date: String,
        #[arg(long)]
        season: Option<String>,
    },

    /// Assemble the context for a player prop, optionally asking for an analysis
    Prop {
        player: String,
        /// The player's own team
        team: String,
        /// Prop label, e.g. Points or Pts+Reb+Ast
        prop: String,
        opponent: String,
        line: f64,
        /// Send the context to the analysis gateway (needs OPENAI_API_KEY)
        #[arg(long)]
        analyze: bool,
    },

    /// Query the local historical per-game dataset
    History {
        csv: PathBuf,
        /// Column filter, repeatable
        #[arg(long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        #[arg(long, default_value_t = chat::HISTORICAL_ROW_LIMIT)]
        limit: usize,
    },

    /// Ask a free-text question; the model fetches what it needs
    Ask {
        query: String,
        /// Historical dataset the model may query
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Show or update the persisted configuration
    Config(ConfigArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// List current configuration settings
    #[arg(long, short = 'l')]
    pub show: bool,

    /// Update the stats provider domain in config
    #[arg(long = "set-stats-domain", value_name = "URL")]
    pub stats_domain: Option<String>,

    /// Update log file path in config. This sets a persistent custom log file location.
    #[arg(long = "set-log-file", value_name = "PATH")]
    pub log_file_path: Option<String>,

    /// Clear the custom log file path from config. This reverts to using the default log location.
    #[arg(long = "clear-log-file", conflicts_with = "log_file_path")]
    pub clear_log_file_path: bool,
}

impl ConfigArgs {
    pub fn is_update(&self) -> bool {
        self.stats_domain.is_some() || self.log_file_path.is_some() || self.clear_log_file_path
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{raw}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("filter '{raw}' has an empty column name"));
    }
    Ok((column.to_string(), value.trim().to_string()))
}
