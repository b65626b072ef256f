//! Per-request analysis context for a player prop.

use serde::Serialize;
use std::future::Future;
use tracing::{info, instrument};

use crate::constants::windows;
use crate::data_fetcher::StatsService;
use crate::data_fetcher::api::current_season;
use crate::data_fetcher::models::{
    EntityKind, EntityReference, FetchOutcome, InjuryEntry, StatTable, TeamRecord,
};

/// One prop bet to analyze, e.g. Nikola Jokic (DEN) Pts+Reb+Ast over/under 48.5 vs LAL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropRequest {
    pub player: String,
    pub player_team: String,
    pub prop_label: String,
    pub opponent: String,
    pub line: f64,
}

/// Everything gathered for one prop. Each section keeps its own outcome; a
/// failed section never blocks the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPropContext {
    pub request: PropRequest,
    pub season: String,
    pub player: FetchOutcome<EntityReference>,
    pub season_stats: FetchOutcome<StatTable>,
    pub last_games: FetchOutcome<StatTable>,
    pub opponent_record: FetchOutcome<TeamRecord>,
    pub opponent_injuries: FetchOutcome<Vec<InjuryEntry>>,
    pub player_team_injuries: FetchOutcome<Vec<InjuryEntry>>,
}

impl PlayerPropContext {
    /// Number of sections that came back successfully.
    pub fn successful_sections(&self) -> usize {
        [
            self.season_stats.is_success(),
            self.last_games.is_success(),
            self.opponent_record.is_success(),
            self.opponent_injuries.is_success(),
            self.player_team_injuries.is_success(),
        ]
        .into_iter()
        .filter(|ok| *ok)
        .count()
    }
}

/// Gathers season stats, the last ten games, the opponent's composite record,
/// and both teams' injuries for the current season.
pub async fn build_player_prop_context(
    service: &StatsService,
    request: PropRequest,
) -> PlayerPropContext {
    build_player_prop_context_for_season(service, request, &current_season()).await
}

#[instrument(skip(service), fields(player = %request.player, opponent = %request.opponent))]
pub async fn build_player_prop_context_for_season(
    service: &StatsService,
    request: PropRequest,
    season: &str,
) -> PlayerPropContext {
    let player = service
        .resolve_entity(EntityKind::Player, &request.player)
        .await;
    let opponent = service
        .resolve_entity(EntityKind::Team, &request.opponent)
        .await;

    let (season_stats, last_games, opponent_record, (opponent_injuries, player_team_injuries)) = futures::join!(
        for_entity(&player, |p| service.fetch_player_season_stats(p, season)),
        for_entity(&player, |p| {
            service.fetch_player_last_n_games(p, season, windows::LAST_N_GAMES)
        }),
        for_entity(&opponent, |team| service.fetch_team_composite(team, season)),
        service.fetch_matchup_injuries(&request.opponent, &request.player_team),
    );

    let context = PlayerPropContext {
        request,
        season: season.to_string(),
        player,
        season_stats,
        last_games,
        opponent_record,
        opponent_injuries,
        player_team_injuries,
    };
    info!(
        "Assembled prop context with {}/5 sections",
        context.successful_sections()
    );
    context
}

/// Runs `fetch` for a resolved entity; an unresolved one passes its outcome on.
pub(crate) async fn for_entity<'a, T, F, Fut>(
    entity: &'a FetchOutcome<EntityReference>,
    fetch: F,
) -> FetchOutcome<T>
where
    F: FnOnce(&'a EntityReference) -> Fut,
    Fut: Future<Output = FetchOutcome<T>>,
{
    match entity {
        FetchOutcome::Success(reference) => fetch(reference).await,
        FetchOutcome::Empty(empty) => FetchOutcome::Empty(empty.clone()),
        FetchOutcome::NotFound(what) => FetchOutcome::NotFound(what.clone()),
        FetchOutcome::Unavailable(reason) => FetchOutcome::Unavailable(reason.clone()),
    }
}
