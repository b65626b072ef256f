//! Prop context assembly and analysis against stubbed collaborators.

use courtside::analysis::{
    AnalysisGateway, ChatMessage, PropRequest, analyze_prop, build_player_prop_context_for_season,
    render_prop_prompt,
};
use courtside::config::Config;
use courtside::data_fetcher::api::{FetchGateway, FetchPolicy};
use courtside::data_fetcher::injuries::{InjuryReports, TextSectionRetriever};
use courtside::data_fetcher::resolver::{PlayerCatalog, PlayerCatalogEntry};
use courtside::{AppError, FetchOutcome, HistoricalDataset, StatsService, Unavailable};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEASON: &str = "2025-26";

fn service(server: &MockServer, dir: &Path) -> StatsService {
    let gateway =
        FetchGateway::new(&server.uri(), FetchPolicy::fast(Duration::from_secs(5))).unwrap();
    let injuries = InjuryReports::new(
        &server.uri(),
        dir.to_path_buf(),
        Duration::from_secs(1),
        Arc::new(TextSectionRetriever),
    )
    .unwrap();
    StatsService::from_parts(Config::default(), gateway, injuries).with_player_catalog(
        PlayerCatalog::new(vec![PlayerCatalogEntry {
            id: 203999,
            full_name: "Nikola Jokic".into(),
        }]),
    )
}

fn request() -> PropRequest {
    PropRequest {
        player: "Nikola Jokic".into(),
        player_team: "Denver Nuggets".into(),
        prop_label: "Pts+Reb+Ast".into(),
        opponent: "Los Angeles Lakers".into(),
        line: 48.5,
    }
}

fn career_body() -> Value {
    json!({"resultSets": [{
        "name": "SeasonTotalsRegularSeason",
        "headers": ["PLAYER_ID", "SEASON_ID", "GP", "PTS", "REB", "AST"],
        "rowSet": [[203999, "2025-26", 15, 29.1, 12.4, 10.2]]
    }]})
}

/// Career stats and league tables succeed; the game log fails and no injury
/// report can be found.
async fn mount_partial_provider(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/playercareerstats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(career_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playergamelog"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/leaguedashteamstats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resultSets": [{
            "name": "LeagueDashTeamStats",
            "headers": ["TEAM_ID", "TEAM_NAME", "PTS", "PLUS_MINUS", "FG_PCT"],
            "rowSet": [[1610612747, "Los Angeles Lakers", 117.0, 1.8, 0.49]]
        }]})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/leaguestandingsv3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resultSets": [{
            "name": "Standings",
            "headers": ["TeamID", "TeamCity", "TeamName", "Conference", "PlayoffRank", "WINS", "LOSSES"],
            "rowSet": [[1610612747, "Los Angeles", "Lakers", "West", 6, 9, 6]]
        }]})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/Injury-Report_.*\.pdf$"))
        .respond_with(ResponseTemplate::new(404))
        // One discovery per context, shared by both teams
        .expect(21)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_prop_context_degrades_per_section() {
    let server = MockServer::start().await;
    mount_partial_provider(&server).await;
    let dir = tempdir().unwrap();
    let service = service(&server, dir.path());

    let context = build_player_prop_context_for_season(&service, request(), SEASON).await;

    assert!(context.player.is_success());
    assert_eq!(context.season_stats.as_success().map(|t| t.len()), Some(1));
    assert!(context.last_games.is_unavailable());
    assert_eq!(
        context.opponent_record.as_success().map(|r| r.rank.as_str()),
        Some("6 in West")
    );
    assert_eq!(
        context.opponent_injuries,
        FetchOutcome::Unavailable(Unavailable::ReportUnavailable)
    );
    assert_eq!(
        context.player_team_injuries,
        FetchOutcome::Unavailable(Unavailable::ReportUnavailable)
    );
    assert_eq!(context.successful_sections(), 2);

    let prompt = render_prop_prompt(&context);
    assert!(prompt.contains("Player Last 10 Games:\n[unavailable]"));
    assert!(prompt.contains("Opponent Injuries:\n[unavailable] injury report unavailable"));
}

#[tokio::test]
async fn test_unknown_player_does_not_block_team_sections() {
    let server = MockServer::start().await;
    mount_partial_provider(&server).await;
    let dir = tempdir().unwrap();
    let service = service(&server, dir.path());

    let mut request = request();
    request.player = "Nobody Special".into();
    let context = build_player_prop_context_for_season(&service, request, SEASON).await;

    assert!(matches!(context.player, FetchOutcome::NotFound(_)));
    assert!(matches!(context.season_stats, FetchOutcome::NotFound(_)));
    assert!(matches!(context.last_games, FetchOutcome::NotFound(_)));
    assert!(context.opponent_record.is_success());
}

/// Answers with a fixed reply and keeps the prompt it was given.
struct CannedGateway {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl AnalysisGateway for CannedGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        let prompt = messages
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);
        Ok(self.reply.clone())
    }
}

#[tokio::test]
async fn test_analyze_prop_parses_fenced_reply() {
    let server = MockServer::start().await;
    mount_partial_provider(&server).await;
    let dir = tempdir().unwrap();
    let service = service(&server, dir.path());

    let reply = json!({
        "playerForm": "Averaging 29.1/12.4/10.2",
        "matchupAnalysis": "Lakers are middling defensively",
        "keyFactors": ["usage", "pace"],
        "trends": "Hit the line in 11 of 15",
        "recommendation": {
            "pick": "Over",
            "reasoning": "Season average clears the line",
            "confidence": "Medium",
            "projectedStat": "51.7"
        }
    });
    let gateway = CannedGateway {
        reply: format!("```json\n{reply}\n```"),
        prompts: Mutex::new(Vec::new()),
    };

    let (context, analysis) = analyze_prop(&service, &gateway, request()).await.unwrap();

    assert_eq!(context.request.line, 48.5);
    assert_eq!(analysis.recommendation.pick, "Over");
    assert_eq!(analysis.recommendation.projected_stat, json!("51.7"));
    let prompts = gateway.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Prop: Pts+Reb+Ast Over/Under 48.5"));
}

#[tokio::test]
async fn test_historical_dataset_round_trip_through_cache() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("per_game.csv");
    std::fs::write(
        &source,
        "PLAYER_NAME,TEAM,GAME_DATE,PTS,REB,AST\n\
         Nikola Jokic,DEN,2024-03-01,31,14,9\n\
         Nikola Jokic,DEN,2024-03-03,18,11,15\n\
         Anthony Davis,LAL,2024-03-03,27,12,2\n",
    )
    .unwrap();

    let loaded = HistoricalDataset::load(&source).await.unwrap();
    let reloaded = HistoricalDataset::load(&source).await.unwrap();
    assert_eq!(loaded.table(), reloaded.table());

    let filters = vec![("TEAM".to_string(), "den".to_string())];
    let rows = reloaded.query(&filters, 10).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.row(1).unwrap().get("AST"), Some(&json!(15)));
}
