use crate::cli::{Command, ConfigArgs};
use chrono::NaiveDate;
use courtside::analysis::{
    CapabilityContext, ChatSession, OpenAiGateway, PropRequest, analyze_prop,
    build_player_prop_context, run_chat_turn,
};
use courtside::config::Config;
use courtside::data_fetcher::{HistoricalDataset, StatsService, current_season};
use courtside::error::AppError;
use courtside::{EntityKind, EntityReference, FetchOutcome};
use serde::Serialize;
use serde_json::{Value, json};
use std::future::Future;
use tracing::info;

/// Handles `config`: prints the settings with `--show`, otherwise applies the
/// requested updates and saves.
pub async fn handle_config_command(args: &ConfigArgs) -> Result<(), AppError> {
    if args.is_update() {
        let mut config = Config::load().await.unwrap_or_default();

        if let Some(new_domain) = &args.stats_domain {
            config.stats_api_domain = new_domain.trim_end_matches('/').to_string();
        }

        if let Some(new_log_path) = &args.log_file_path {
            config.log_file_path = Some(new_log_path.clone());
        } else if args.clear_log_file_path {
            config.log_file_path = None;
            println!("Custom log file path cleared. Using default location.");
        }

        config.validate()?;
        config.save().await?;
        println!("Config updated successfully!");
    }

    if args.show || !args.is_update() {
        let config = Config::load().await?;
        println!("{}", config.describe());
    }

    Ok(())
}

/// Runs one data command and prints its result as pretty JSON.
pub async fn run_command(command: Command, config: Config) -> Result<(), AppError> {
    let service = StatsService::new(config)?;
    let output = execute(&service, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn execute(service: &StatsService, command: Command) -> Result<Value, AppError> {
    let value = match command {
        Command::Player { name, season } => {
            let season = season.unwrap_or_else(current_season);
            for_player(service, &name, |p| async move {
                service.fetch_player_season_stats(&p, &season).await
            })
            .await?
        }
        Command::LastGames { name, n, season } => {
            let season = season.unwrap_or_else(current_season);
            for_player(service, &name, |p| async move {
                service.fetch_player_last_n_games(&p, &season, n).await
            })
            .await?
        }
        Command::HeadToHead {
            name,
            opponent,
            season,
        } => {
            let season = season.unwrap_or_else(current_season);
            for_player(service, &name, |p| async move {
                service.fetch_head_to_head(&p, &opponent, &season).await
            })
            .await?
        }
        Command::Team { name, season } => {
            let season = season.unwrap_or_else(current_season);
            let team = service.resolve_entity(EntityKind::Team, &name).await;
            match team {
                FetchOutcome::Success(team) => {
                    serde_json::to_value(service.fetch_team_composite(&team, &season).await)?
                }
                other => serde_json::to_value(other)?,
            }
        }
        Command::Leaders { season } => {
            let season = season.unwrap_or_else(current_season);
            serde_json::to_value(service.fetch_league_leaders(&season).await)?
        }
        Command::Standings { season } => {
            let season = season.unwrap_or_else(current_season);
            serde_json::to_value(service.fetch_standings_by_conference(&season).await)?
        }
        Command::Injuries { team } => serde_json::to_value(service.fetch_injury_report(&team).await)?,
        Command::OnDate { name, date, season } => {
            let day = parse_date(&date)?;
            let season = season.unwrap_or_else(current_season);
            for_player(service, &name, |p| async move {
                service.fetch_player_stats_on_date(&p, day, &season).await
            })
            .await?
        }
        Command::Prop {
            player,
            team,
            prop,
            opponent,
            line,
            analyze,
        } => {
            let request = PropRequest {
                player,
                player_team: team,
                prop_label: prop,
                opponent,
                line,
            };
            if analyze {
                let gateway = OpenAiGateway::from_config(service.config())?;
                let (context, analysis) = analyze_prop(service, &gateway, request).await?;
                json!({ "context": context, "analysis": analysis })
            } else {
                serde_json::to_value(build_player_prop_context(service, request).await)?
            }
        }
        Command::History {
            csv,
            filters,
            limit,
        } => {
            let dataset = HistoricalDataset::load(&csv).await?;
            let rows = dataset.query(&filters, limit)?;
            info!("History query matched {} rows", rows.len());
            serde_json::to_value(rows.to_records())?
        }
        Command::Ask { query, dataset } => {
            let gateway = OpenAiGateway::from_config(service.config())?;
            let dataset = match dataset {
                Some(path) => Some(HistoricalDataset::load(&path).await?),
                None => None,
            };
            let ctx = CapabilityContext {
                service,
                dataset: dataset.as_ref(),
            };
            let mut session = ChatSession::new();
            let answer = run_chat_turn(&gateway, &mut session, &ctx, &query).await?;
            json!({ "answer": answer })
        }
        Command::Config(_) => {
            return Err(AppError::config_error(
                "config is handled before the stats service starts",
            ));
        }
    };
    Ok(value)
}

/// Resolves `name` to a player and runs `fetch` for it. An unresolved name is
/// reported as its own outcome.
async fn for_player<T, F, Fut>(
    service: &StatsService,
    name: &str,
    fetch: F,
) -> Result<Value, AppError>
where
    T: Serialize,
    F: FnOnce(EntityReference) -> Fut,
    Fut: Future<Output = FetchOutcome<T>>,
{
    let value = match service.resolve_entity(EntityKind::Player, name).await {
        FetchOutcome::Success(player) => serde_json::to_value(fetch(player).await)?,
        other => serde_json::to_value(other)?,
    };
    Ok(value)
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::datetime_parse_error(format!("invalid date '{raw}': {e}")))
}
