//! Questions sent to the document retriever and parsing of its answers.

use tracing::debug;

use crate::data_fetcher::models::InjuryEntry;

/// Marker the retriever answers with when a team has no entries.
pub const NO_ENTRIES: &str = "NONE";

/// A question scoped to one team's section of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuestion {
    /// Team header to look under, e.g. "Denver Nuggets"
    pub team: String,
    /// Natural-language form of the question
    pub text: String,
}

impl ReportQuestion {
    pub fn for_team(team: &str) -> Self {
        let team = team.trim();
        let text = format!(
            "In this injury report, find the section headed \"{team}\". List only the players \
             whose entries appear directly under that header, before the next team's header. \
             Do not include players listed under any other team, even if they appear on the same \
             page or next to the {team} section. Answer with one line per player in the form \
             `Player | Status | Reason` and nothing else. If {team} has no entries, answer {NO_ENTRIES}."
        );
        Self {
            team: team.to_string(),
            text,
        }
    }
}

/// Parses `Player | Status | Reason` lines. Bullets, numbering, blank lines,
/// and a header line are tolerated; lines without at least a player and a
/// status are skipped.
pub fn parse_injury_answer(answer: &str) -> Vec<InjuryEntry> {
    let answer = answer.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case(NO_ENTRIES) {
        return Vec::new();
    }

    answer
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case(NO_ENTRIES))
        .filter_map(|line| {
            let mut parts = line.split('|').map(str::trim);
            let player = parts.next().filter(|p| !p.is_empty())?;
            let status = parts.next().filter(|s| !s.is_empty())?;
            if player.eq_ignore_ascii_case("player") && status.eq_ignore_ascii_case("status") {
                return None;
            }
            let reason = parts.collect::<Vec<_>>().join(" | ");
            Some(InjuryEntry {
                player: player.to_string(),
                status: status.to_string(),
                reason,
            })
        })
        .inspect(|entry| debug!("Parsed injury entry for {}", entry.player))
        .collect()
}

/// Formats entries the way the retriever is asked to answer.
pub fn format_injury_answer(entries: &[InjuryEntry]) -> String {
    if entries.is_empty() {
        return NO_ENTRIES.to_string();
    }
    entries
        .iter()
        .map(|e| format!("{} | {} | {}", e.player, e.status, e.reason))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();
    // "1." / "12)" numbering
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim_start();
        }
    }
    line
}
