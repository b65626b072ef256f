//! Prompt rendering for prop analysis and parsing of the structured reply.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, instrument};

use super::context::{PlayerPropContext, PropRequest, build_player_prop_context};
use super::gateway::{AnalysisGateway, ChatMessage, strip_code_fences};
use crate::data_fetcher::StatsService;
use crate::data_fetcher::injuries::format_injury_answer;
use crate::data_fetcher::models::FetchOutcome;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropAnalysis {
    pub player_form: String,
    pub matchup_analysis: String,
    #[serde(default)]
    pub key_factors: Vec<String>,
    #[serde(default)]
    pub trends: String,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// "Over" or "Under"
    pub pick: String,
    pub reasoning: String,
    /// "Low", "Medium" or "High"
    pub confidence: String,
    /// Models answer with either a number or a string here
    pub projected_stat: serde_json::Value,
}

/// Renders the prop context into the analysis prompt. Sections that did not
/// come back are labelled with their outcome instead of being left out.
pub fn render_prop_prompt(context: &PlayerPropContext) -> String {
    let PropRequest {
        player,
        player_team,
        prop_label,
        opponent,
        line,
    } = &context.request;

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Analyze this NBA player prop bet and return ONLY valid JSON (no other text, no markdown, no code blocks).\n"
    );
    let _ = writeln!(prompt, "Player: {player}");
    let _ = writeln!(prompt, "Player Team: {player_team}");
    let _ = writeln!(prompt, "Prop: {prop_label} Over/Under {line}");
    let _ = writeln!(prompt, "Opponent: {opponent}");
    let _ = writeln!(prompt, "Season: {}\n", context.season);
    let _ = writeln!(
        prompt,
        "If the prop names more than one category, e.g. \"Pts+Reb+Ast\", the bet is on the sum of those categories.\n"
    );

    let _ = writeln!(prompt, "DATA:");
    section(&mut prompt, "Player Season Stats", &context.season_stats, |t| t.to_text());
    section(&mut prompt, "Player Last 10 Games", &context.last_games, |t| t.to_text());
    section(&mut prompt, "Opponent Team Stats", &context.opponent_record, |record| {
        serde_json::to_string(record).unwrap_or_default()
    });
    section(&mut prompt, "Opponent Injuries", &context.opponent_injuries, |entries| {
        format_injury_answer(entries)
    });
    section(
        &mut prompt,
        "Player's Team's Injuries",
        &context.player_team_injuries,
        |entries| format_injury_answer(entries),
    );

    prompt.push_str(
        r#"
Do NOT wrap your response in ```json or ``` markers. Return ONLY the raw JSON object.

Return ONLY this JSON structure:
{
  "playerForm": "analysis of recent form and season stats",
  "matchupAnalysis": "how opponent defends this category",
  "keyFactors": ["factor1", "factor2", "factor3", "factor4"],
  "trends": "recent trends",
  "recommendation": {
    "pick": "Over or Under",
    "reasoning": "explanation",
    "confidence": "Low/Medium/High",
    "projectedStat": "number"
  }
}
"#,
    );
    prompt
}

fn section<T>(
    prompt: &mut String,
    title: &str,
    outcome: &FetchOutcome<T>,
    render: impl FnOnce(&T) -> String,
) {
    let body = match outcome {
        FetchOutcome::Success(value) => render(value),
        other => format!(
            "[{}] {}",
            other.label(),
            other.reason().unwrap_or_default()
        ),
    };
    let _ = writeln!(prompt, "{title}:\n{body}\n");
}

/// Parses the model's reply, tolerating code fences around the JSON.
pub fn parse_recommendation(reply: &str) -> Result<PropAnalysis, AppError> {
    let cleaned = strip_code_fences(reply);
    debug!(
        "Cleaned analysis preview: {}",
        cleaned.chars().take(200).collect::<String>()
    );
    serde_json::from_str(cleaned)
        .map_err(|e| AppError::analysis_error(format!("reply is not the expected JSON: {e}")))
}

/// Assembles the context, asks the gateway, and parses its recommendation.
#[instrument(skip(service, gateway))]
pub async fn analyze_prop<G: AnalysisGateway>(
    service: &StatsService,
    gateway: &G,
    request: PropRequest,
) -> Result<(PlayerPropContext, PropAnalysis), AppError> {
    let context = build_player_prop_context(service, request).await;
    let prompt = render_prop_prompt(&context);
    let reply = gateway.complete(&[ChatMessage::user(prompt)]).await?;
    let analysis = parse_recommendation(&reply)?;
    Ok((context, analysis))
}
