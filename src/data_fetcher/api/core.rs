use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::constants::windows;
use crate::data_fetcher::injuries::{
    DocumentRetriever, InjuryReports, ReportDocument, TextSectionRetriever,
};
use crate::data_fetcher::models::{
    ConferenceStandings, EntityKind, EntityReference, FetchOutcome, InjuryEntry, LeagueLeaders,
    StatRecord, StatTable, TeamInfo, TeamRecord, Unavailable,
};
use crate::data_fetcher::processors;
use crate::data_fetcher::resolver::{NotFound, PlayerCatalog, resolve_team_info};
use crate::error::AppError;

use super::fetch_utils::FetchGateway;
use super::season_utils::current_season;
use super::urls::{
    Endpoint, all_players_params, league_leaders_params, player_career_params,
    player_game_log_params, standings_params, team_stats_params,
};

/// Entry point for every retrieval operation.
///
/// Owns the fetch gateway (and with it the response cache), the injury report
/// retriever, and the lazily loaded player catalog. Every operation returns a
/// [`FetchOutcome`]; transport faults never escape as errors.
#[derive(Debug)]
pub struct StatsService {
    config: Config,
    gateway: FetchGateway,
    injuries: InjuryReports,
    players: OnceCell<PlayerCatalog>,
}

impl StatsService {
    /// Builds the service from configuration with the plain-text report retriever.
    pub fn new(config: Config) -> Result<Self, AppError> {
        Self::with_retriever(config, Arc::new(TextSectionRetriever))
    }

    pub fn with_retriever(
        config: Config,
        retriever: Arc<dyn DocumentRetriever>,
    ) -> Result<Self, AppError> {
        let gateway = FetchGateway::from_config(&config)?;
        let injuries = InjuryReports::from_config(&config, retriever)?;
        Ok(Self::from_parts(config, gateway, injuries))
    }

    pub fn from_parts(config: Config, gateway: FetchGateway, injuries: InjuryReports) -> Self {
        Self {
            config,
            gateway,
            injuries,
            players: OnceCell::new(),
        }
    }

    /// Uses `catalog` instead of loading the provider's player list.
    pub fn with_player_catalog(mut self, catalog: PlayerCatalog) -> Self {
        self.players = OnceCell::new_with(Some(catalog));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &FetchGateway {
        &self.gateway
    }

    /// Player catalog, fetched on first use and kept for the service lifetime.
    /// A failed load is not remembered; the next call tries again.
    pub async fn player_catalog(&self) -> Result<&PlayerCatalog, Unavailable> {
        self.players
            .get_or_try_init(|| async {
                let season = current_season();
                info!("Loading player catalog for {season}");
                match self
                    .gateway
                    .fetch_table(Endpoint::CommonAllPlayers, &all_players_params(&season))
                    .await
                {
                    FetchOutcome::Success(table) => {
                        PlayerCatalog::from_table(&table).map_err(Unavailable::from)
                    }
                    FetchOutcome::Unavailable(reason) => Err(reason),
                    other => Err(Unavailable::Upstream(format!(
                        "player catalog request returned {}",
                        other.label()
                    ))),
                }
            })
            .await
    }

    /// Resolves a free-text name to an entity. Blank names are `NotFound`
    /// without touching the provider.
    #[instrument(skip(self))]
    pub async fn resolve_entity(&self, kind: EntityKind, name: &str) -> FetchOutcome<EntityReference> {
        if name.trim().is_empty() {
            return not_found(NotFound {
                kind,
                query: String::new(),
            });
        }

        match kind {
            EntityKind::Team => match resolve_team_info(name) {
                Ok(team) => FetchOutcome::Success(team.reference()),
                Err(e) => not_found(e),
            },
            EntityKind::Player => match self.player_catalog().await {
                Ok(catalog) => match catalog.resolve(name) {
                    Ok(player) => FetchOutcome::Success(player),
                    Err(e) => not_found(e),
                },
                Err(reason) => FetchOutcome::Unavailable(reason),
            },
        }
    }

    pub fn resolve_team(&self, name: &str) -> FetchOutcome<&'static TeamInfo> {
        match resolve_team_info(name) {
            Ok(team) => FetchOutcome::Success(team),
            Err(e) => not_found(e),
        }
    }

    /// The player's regular-season line for `season`.
    #[instrument(skip(self))]
    pub async fn fetch_player_season_stats(
        &self,
        player: &EntityReference,
        season: &str,
    ) -> FetchOutcome<StatTable> {
        let career = self
            .gateway
            .fetch_table(Endpoint::PlayerCareerStats, &player_career_params(player.id))
            .await;
        processors::season_rows(career, season)
    }

    /// The player's most recent `n` games of `season`.
    #[instrument(skip(self))]
    pub async fn fetch_player_last_n_games(
        &self,
        player: &EntityReference,
        season: &str,
        n: usize,
    ) -> FetchOutcome<StatTable> {
        let log = self.game_log(player, season).await;
        processors::last_n_games(log, n)
    }

    /// The player's games this season against `opponent` (abbreviation or team name).
    #[instrument(skip(self))]
    pub async fn fetch_head_to_head(
        &self,
        player: &EntityReference,
        opponent: &str,
        season: &str,
    ) -> FetchOutcome<StatTable> {
        let opponent = match resolve_team_info(opponent) {
            Ok(team) => team,
            Err(e) => return not_found(e),
        };
        let log = self.game_log(player, season).await;
        processors::head_to_head(log, opponent.abbreviation, season)
    }

    /// Composite record for one team: per-game stats joined with standings.
    #[instrument(skip(self))]
    pub async fn fetch_team_composite(
        &self,
        team: &EntityReference,
        season: &str,
    ) -> FetchOutcome<TeamRecord> {
        let (team_stats, standings) = self.league_tables(season).await;
        processors::team_composite(team.id, team_stats, standings)
    }

    /// Top players per category, each category ranked on its own.
    #[instrument(skip(self))]
    pub async fn fetch_league_leaders(&self, season: &str) -> FetchOutcome<LeagueLeaders> {
        let leaders = self
            .gateway
            .fetch_table(Endpoint::LeagueLeaders, &league_leaders_params(season))
            .await;
        processors::league_leaders(leaders, windows::LEADERS_TOP_N)
    }

    #[instrument(skip(self))]
    pub async fn fetch_standings_by_conference(
        &self,
        season: &str,
    ) -> FetchOutcome<ConferenceStandings> {
        let (team_stats, standings) = self.league_tables(season).await;
        processors::standings_by_conference(team_stats, standings)
    }

    /// Injury entries under the team's section of the current report.
    pub async fn fetch_injury_report(&self, team_name: &str) -> FetchOutcome<Vec<InjuryEntry>> {
        match resolve_team_info(team_name) {
            Ok(team) => self.injuries.team_injuries(team.full_name).await,
            Err(e) => not_found(e),
        }
    }

    /// Like [`fetch_injury_report`](Self::fetch_injury_report) with report
    /// discovery anchored at `today`.
    pub async fn fetch_injury_report_on(
        &self,
        team_name: &str,
        today: NaiveDate,
    ) -> FetchOutcome<Vec<InjuryEntry>> {
        match resolve_team_info(team_name) {
            Ok(team) => self.injuries.team_injuries_on(team.full_name, today).await,
            Err(e) => not_found(e),
        }
    }

    /// Injuries for both sides of a matchup from a single discovery of the
    /// current report.
    pub async fn fetch_matchup_injuries(
        &self,
        first: &str,
        second: &str,
    ) -> (FetchOutcome<Vec<InjuryEntry>>, FetchOutcome<Vec<InjuryEntry>>) {
        self.fetch_matchup_injuries_on(first, second, Local::now().date_naive())
            .await
    }

    #[instrument(skip(self))]
    pub async fn fetch_matchup_injuries_on(
        &self,
        first: &str,
        second: &str,
        today: NaiveDate,
    ) -> (FetchOutcome<Vec<InjuryEntry>>, FetchOutcome<Vec<InjuryEntry>>) {
        let first = resolve_team_info(first);
        let second = resolve_team_info(second);
        if let (Err(a), Err(b)) = (&first, &second) {
            return (not_found(a.clone()), not_found(b.clone()));
        }

        let report = self.injuries.report_on(today).await;
        (
            self.injuries_from(&report, first).await,
            self.injuries_from(&report, second).await,
        )
    }

    async fn injuries_from(
        &self,
        report: &Result<ReportDocument, Unavailable>,
        team: Result<&'static TeamInfo, NotFound>,
    ) -> FetchOutcome<Vec<InjuryEntry>> {
        match (team, report) {
            (Err(e), _) => not_found(e),
            (Ok(_), Err(reason)) => FetchOutcome::unavailable(reason.clone()),
            (Ok(team), Ok(document)) => self.injuries.answer_for(document, team.full_name).await,
        }
    }

    /// The player's stat line for the game played on `date`.
    #[instrument(skip(self))]
    pub async fn fetch_player_stats_on_date(
        &self,
        player: &EntityReference,
        date: NaiveDate,
        season: &str,
    ) -> FetchOutcome<StatRecord> {
        let log = self.game_log(player, season).await;
        processors::game_on_date(log, date)
    }

    async fn game_log(&self, player: &EntityReference, season: &str) -> FetchOutcome<StatTable> {
        if player.kind != EntityKind::Player {
            warn!("Game log requested for non-player {}", player.display_name);
        }
        self.gateway
            .fetch_table(
                Endpoint::PlayerGameLog,
                &player_game_log_params(player.id, season),
            )
            .await
    }

    /// Team stats then standings. Both are heavy calls, so the gateway paces them.
    async fn league_tables(
        &self,
        season: &str,
    ) -> (FetchOutcome<StatTable>, FetchOutcome<StatTable>) {
        let team_stats = self
            .gateway
            .fetch_table(Endpoint::LeagueDashTeamStats, &team_stats_params(season))
            .await;
        let standings = self
            .gateway
            .fetch_table(Endpoint::LeagueStandings, &standings_params(season))
            .await;
        debug!(
            "League tables for {season}: team stats {}, standings {}",
            team_stats.label(),
            standings.label()
        );
        (team_stats, standings)
    }
}

fn not_found<T>(e: NotFound) -> FetchOutcome<T> {
    debug!("{e}");
    FetchOutcome::NotFound(format!("{} '{}'", e.kind, e.query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::fetch_utils::FetchPolicy;
    use crate::data_fetcher::resolver::PlayerCatalogEntry;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> StatsService {
        let dir = std::env::temp_dir().join("courtside-service-tests");
        let gateway =
            FetchGateway::new(&server.uri(), FetchPolicy::fast(Duration::from_secs(5))).unwrap();
        let injuries = InjuryReports::new(
            &server.uri(),
            dir,
            Duration::from_secs(1),
            Arc::new(TextSectionRetriever),
        )
        .unwrap();
        StatsService::from_parts(Config::default(), gateway, injuries)
    }

    fn all_players() -> serde_json::Value {
        json!({
            "resultSets": [{
                "name": "CommonAllPlayers",
                "headers": ["PERSON_ID", "DISPLAY_FIRST_LAST"],
                "rowSet": [[2544, "LeBron James"], [203999, "Nikola Jokic"]]
            }]
        })
    }

    #[tokio::test]
    async fn test_blank_name_is_not_found_without_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(all_players()))
            .expect(0)
            .mount(&server)
            .await;

        let service = service(&server);
        for name in ["", "   ", "\t"] {
            let outcome = service.resolve_entity(EntityKind::Player, name).await;
            assert!(matches!(outcome, FetchOutcome::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn test_player_catalog_loaded_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commonallplayers"))
            .and(query_param("IsOnlyCurrentSeason", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(all_players()))
            .expect(1)
            .mount(&server)
            .await;

        let service = service(&server);
        let jokic = service.resolve_entity(EntityKind::Player, "jokic").await;
        let lebron = service.resolve_entity(EntityKind::Player, "Lebron James").await;
        service.gateway().cache().clear().await;
        let missing = service.resolve_entity(EntityKind::Player, "Bill Russell").await;

        assert_eq!(jokic, FetchOutcome::Success(EntityReference::player(203999, "Nikola Jokic")));
        assert_eq!(lebron.success().map(|p| p.id), Some(2544));
        assert_eq!(
            missing,
            FetchOutcome::NotFound("Player 'Bill Russell'".to_string())
        );
    }

    #[tokio::test]
    async fn test_catalog_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/commonallplayers"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = service(&server);
        let outcome = service.resolve_entity(EntityKind::Player, "Jokic").await;
        assert!(outcome.is_unavailable());
    }

    #[tokio::test]
    async fn test_seeded_catalog_skips_provider() {
        let server = MockServer::start().await;
        let service = service(&server).with_player_catalog(PlayerCatalog::new(vec![
            PlayerCatalogEntry {
                id: 1629029,
                full_name: "Luka Doncic".into(),
            },
        ]));

        let outcome = service.resolve_entity(EntityKind::Player, "Luka Dončic").await;
        // Accents are not folded, but a one-letter difference is within fuzzy range
        assert_eq!(outcome.success().map(|p| p.id), Some(1629029));
    }

    #[tokio::test]
    async fn test_head_to_head_unknown_opponent() {
        let server = MockServer::start().await;
        let service = service(&server);
        let player = EntityReference::player(203999, "Nikola Jokic");

        let outcome = service.fetch_head_to_head(&player, "QQQ", "2025-26").await;
        assert!(matches!(outcome, FetchOutcome::NotFound(_)));
    }

    #[tokio::test]
    async fn test_injury_report_for_unknown_team() {
        let server = MockServer::start().await;
        let service = service(&server);
        let outcome = service.fetch_injury_report("Seattle Supersonics").await;
        assert!(matches!(outcome, FetchOutcome::NotFound(_)));
    }
}
