//! Free-text chat over the capability set.
//!
//! Nothing is fetched up front. The model is told which capabilities exist and
//! asks for data itself; each requested capability runs and its JSON result is
//! handed back until the model answers or the per-turn limit is reached.

use std::fmt::Write as _;
use tracing::{debug, info, instrument, warn};

use super::capabilities::{CAPABILITIES, CapabilityContext, parse_capability_call};
use super::gateway::{AnalysisGateway, ChatMessage};
use crate::constants::chat::MAX_CAPABILITY_CALLS;
use crate::error::AppError;

/// Conversation history owned by the caller. Messages are only ever appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// System message describing the capability set and how to call it.
pub fn system_preamble() -> String {
    let mut preamble = String::from(
        "You are an NBA statistics assistant. You can request data with exactly one JSON object \
         per reply, shaped {\"capability\": <name>, \"arguments\": {..}}, and nothing else in \
         that reply. When you have enough data, answer in plain text.\n\nCapabilities:\n",
    );
    for capability in CAPABILITIES {
        let _ = writeln!(
            preamble,
            "- {}: {} Arguments: {}",
            capability.name, capability.description, capability.arguments
        );
    }
    let _ = write!(
        preamble,
        "\nAt most {MAX_CAPABILITY_CALLS} capability calls are answered per question."
    );
    preamble
}

/// Appends `query` to the session and returns the messages for the gateway:
/// the preamble followed by the whole history.
pub fn build_chat_context(session: &mut ChatSession, query: &str) -> Vec<ChatMessage> {
    session.push(ChatMessage::user(query));
    std::iter::once(ChatMessage::system(system_preamble()))
        .chain(session.messages().iter().cloned())
        .collect()
}

/// Answers one user query. Only the query and the final answer are recorded in
/// the session; capability exchanges stay local to the turn.
#[instrument(skip(gateway, session, ctx))]
pub async fn run_chat_turn<G: AnalysisGateway>(
    gateway: &G,
    session: &mut ChatSession,
    ctx: &CapabilityContext<'_>,
    query: &str,
) -> Result<String, AppError> {
    let mut messages = build_chat_context(session, query);
    let mut calls = 0;

    let answer = loop {
        let reply = gateway.complete(&messages).await?;

        let call = match parse_capability_call(&reply) {
            Ok(None) => break reply,
            Ok(Some(call)) => Ok(call),
            Err(problem) => Err(problem),
        };

        if calls == MAX_CAPABILITY_CALLS {
            warn!("Capability limit reached, asking for a final answer");
            messages.push(ChatMessage::assistant(reply));
            messages.push(ChatMessage::user(
                "Capability limit reached. Answer the question in plain text with the data you already have.",
            ));
            break gateway.complete(&messages).await?;
        }
        calls += 1;

        let result = match call {
            Ok(call) => {
                debug!("Invoking {} ({calls}/{MAX_CAPABILITY_CALLS})", call.name());
                match call.invoke(ctx).await {
                    Ok(value) => format!(
                        "Result of {}:\n{}",
                        call.name(),
                        serde_json::to_string(&value)?
                    ),
                    Err(e) => format!("{} failed: {e}", call.name()),
                }
            }
            Err(problem) => problem,
        };
        messages.push(ChatMessage::assistant(reply));
        messages.push(ChatMessage::user(result));
    };

    info!("Chat turn answered after {calls} capability calls");
    session.push(ChatMessage::assistant(answer.clone()));
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::gateway::Role;
    use crate::config::Config;
    use crate::data_fetcher::api::FetchGateway;
    use crate::data_fetcher::injuries::{InjuryReports, TextSectionRetriever};
    use crate::data_fetcher::models::StatTable;
    use crate::data_fetcher::{FetchPolicy, HistoricalDataset, StatsService};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use wiremock::MockServer;

    /// Replays canned replies and records what it was sent.
    struct ScriptedGateway {
        replies: Mutex<VecDeque<String>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedGateway {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl AnalysisGateway for ScriptedGateway {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AppError::analysis_error("script exhausted"))
        }
    }

    fn service(server: &MockServer) -> StatsService {
        let gateway =
            FetchGateway::new(&server.uri(), FetchPolicy::fast(Duration::from_secs(2))).unwrap();
        let injuries = InjuryReports::new(
            &server.uri(),
            std::env::temp_dir().join("courtside-chat-tests"),
            Duration::from_secs(1),
            Arc::new(TextSectionRetriever),
        )
        .unwrap();
        StatsService::from_parts(Config::default(), gateway, injuries)
    }

    fn dataset() -> HistoricalDataset {
        let table = StatTable::try_new(
            "games",
            vec!["PLAYER_NAME".into(), "PTS".into()],
            vec![
                vec![json!("Nikola Jokic"), json!(31)],
                vec![json!("Jamal Murray"), json!(22)],
            ],
        )
        .unwrap();
        HistoricalDataset::from_table("games.csv", table)
    }

    const TABLE_CALL: &str = r#"{"capability": "query_historical_table", "arguments": {"filters": {"PLAYER_NAME": "Nikola Jokic"}}}"#;

    #[test]
    fn test_build_chat_context_appends_query() {
        let mut session = ChatSession::new();
        session.push(ChatMessage::user("Who leads the league in assists?"));
        session.push(ChatMessage::assistant("Trae Young."));

        let messages = build_chat_context(&mut session, "And in rebounds?");

        assert_eq!(session.len(), 3);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("query_player_on_date"));
        assert_eq!(messages[3], ChatMessage::user("And in rebounds?"));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = ChatSession::new();
        let second = ChatSession::new();
        build_chat_context(&mut first, "hello");
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_direct_answer_uses_no_capabilities() {
        let server = MockServer::start().await;
        let service = service(&server);
        let ctx = CapabilityContext {
            service: &service,
            dataset: None,
        };
        let gateway = ScriptedGateway::new(&["Jokic is the reigning MVP."]);
        let mut session = ChatSession::new();

        let answer = run_chat_turn(&gateway, &mut session, &ctx, "Who is Jokic?")
            .await
            .unwrap();

        assert_eq!(answer, "Jokic is the reigning MVP.");
        assert_eq!(gateway.calls(), 1);
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn test_capability_result_is_fed_back() {
        let server = MockServer::start().await;
        let service = service(&server);
        let dataset = dataset();
        let ctx = CapabilityContext {
            service: &service,
            dataset: Some(&dataset),
        };
        let gateway = ScriptedGateway::new(&[TABLE_CALL, "Jokic scored 31."]);
        let mut session = ChatSession::new();

        let answer = run_chat_turn(&gateway, &mut session, &ctx, "How many did Jokic score?")
            .await
            .unwrap();

        assert_eq!(answer, "Jokic scored 31.");
        let seen = gateway.seen.lock().unwrap();
        let last = seen[1].last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(last.content.starts_with("Result of query_historical_table"));
        assert!(last.content.contains("\"PTS\":31"));
        // Capability traffic is not kept in the caller's history
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn test_capability_calls_are_capped() {
        let server = MockServer::start().await;
        let service = service(&server);
        let dataset = dataset();
        let ctx = CapabilityContext {
            service: &service,
            dataset: Some(&dataset),
        };
        let gateway = ScriptedGateway::new(&[
            TABLE_CALL,
            TABLE_CALL,
            TABLE_CALL,
            TABLE_CALL,
            "Done: 31 points.",
        ]);
        let mut session = ChatSession::new();

        let answer = run_chat_turn(&gateway, &mut session, &ctx, "Jokic points?")
            .await
            .unwrap();

        assert_eq!(answer, "Done: 31 points.");
        assert_eq!(gateway.calls(), MAX_CAPABILITY_CALLS + 2);
        let seen = gateway.seen.lock().unwrap();
        assert!(
            seen.last()
                .and_then(|m| m.last())
                .is_some_and(|m| m.content.starts_with("Capability limit reached"))
        );
    }

    #[tokio::test]
    async fn test_invalid_call_is_reported_to_model() {
        let server = MockServer::start().await;
        let service = service(&server);
        let ctx = CapabilityContext {
            service: &service,
            dataset: None,
        };
        let gateway = ScriptedGateway::new(&[
            r#"{"capability": "query_everything", "arguments": {}}"#,
            "Sorry, I cannot do that.",
        ]);
        let mut session = ChatSession::new();

        let answer = run_chat_turn(&gateway, &mut session, &ctx, "Everything?")
            .await
            .unwrap();

        assert_eq!(answer, "Sorry, I cannot do that.");
        let seen = gateway.seen.lock().unwrap();
        assert!(seen[1].last().unwrap().content.starts_with("invalid capability call"));
    }
}
