//! Analysis layer: prop context assembly, the language-model gateway, and
//! capability-driven chat.

pub mod capabilities;
pub mod chat;
pub mod context;
pub mod gateway;
pub mod prompt;

pub use capabilities::{CAPABILITIES, Capability, CapabilityContext, parse_capability_call};
pub use chat::{ChatSession, build_chat_context, run_chat_turn};
pub use context::{
    PlayerPropContext, PropRequest, build_player_prop_context,
    build_player_prop_context_for_season,
};
pub use gateway::{AnalysisGateway, ChatMessage, OpenAiGateway, Role, strip_code_fences};
pub use prompt::{PropAnalysis, Recommendation, analyze_prop, parse_recommendation, render_prop_prompt};
