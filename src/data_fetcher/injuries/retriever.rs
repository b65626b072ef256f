//! Document retrieval: turning a downloaded report into an answer for one team.

use pdf_extract::extract_text_from_mem;
use std::path::Path;
use tracing::debug;

use super::answers::{NO_ENTRIES, ReportQuestion};
use crate::data_fetcher::resolver::TEAMS;
use crate::error::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Answers a team-scoped question about a downloaded report document.
///
/// Implementations may index the document however they like; callers only
/// rely on the `Player | Status | Reason` / `NONE` answer format. Calls are
/// made from a blocking thread.
pub trait DocumentRetriever: Send + Sync {
    fn answer(&self, document: &Path, question: &ReportQuestion) -> Result<String, AppError>;
}

/// Retriever for reports whose text layer reads as plain lines: a team's full
/// name on its own line, followed by its entries until the next team header.
///
/// Entry fields are separated by `|`, tabs, or runs of two or more spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSectionRetriever;

impl DocumentRetriever for TextSectionRetriever {
    fn answer(&self, document: &Path, question: &ReportQuestion) -> Result<String, AppError> {
        let bytes = std::fs::read(document)?;
        let text = document_text(&bytes)?;
        answer_from_text(&text, &question.team)
    }
}

/// Text layer of a downloaded report. PDFs are decoded with `pdf_extract`;
/// anything else has to be UTF-8 text already.
pub fn document_text(bytes: &[u8]) -> Result<String, AppError> {
    if bytes.starts_with(PDF_MAGIC) {
        extract_text_from_mem(bytes)
            .map_err(|e| AppError::document_error(format!("could not extract report text: {e}")))
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::document_error("report is neither a PDF nor UTF-8 text"))
    }
}

/// Collects the entries under `team`'s header line.
///
/// A text with no team header at all is not a report this retriever can read,
/// so it is an error rather than an empty answer.
pub fn answer_from_text(text: &str, team: &str) -> Result<String, AppError> {
    let mut seen_header = false;
    let mut in_section = false;
    let mut lines = Vec::new();

    for line in text.lines().map(str::trim) {
        if is_team_header(line) {
            if in_section {
                break;
            }
            seen_header = true;
            in_section = line.eq_ignore_ascii_case(team.trim());
            continue;
        }
        if !in_section || line.is_empty() {
            continue;
        }

        let fields = split_fields(line);
        if let [player, status, rest @ ..] = fields.as_slice() {
            lines.push(format!("{player} | {status} | {}", rest.join(" ")));
        } else {
            debug!("Ignoring report line without status: '{line}'");
        }
    }

    if !seen_header {
        return Err(AppError::document_error("no team sections found in injury report"));
    }
    if lines.is_empty() {
        Ok(NO_ENTRIES.to_string())
    } else {
        Ok(lines.join("\n"))
    }
}

fn is_team_header(line: &str) -> bool {
    TEAMS
        .iter()
        .any(|team| line.eq_ignore_ascii_case(team.full_name))
}

fn split_fields(line: &str) -> Vec<&str> {
    let fields: Vec<&str> = if line.contains('|') {
        line.split('|').collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split("  ").collect()
    };
    fields
        .into_iter()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COMPRESSED_REPORT: &[u8] = include_bytes!("../../../tests/fixtures/injury_report.pdf");

    const REPORT: &str = "Injury Report: 10/19/26 05:00 PM\n\
        Boston Celtics\n\
        Tatum, Jayson    Out    Injury/Illness - Right Achilles; Repair\n\
        Denver Nuggets\n\
        Jokic, Nikola\tQuestionable\tLeft Ankle; Sprain\n\
        Murray, Jamal | Out | Hamstring\n\
        NOT YET SUBMITTED\n\
        \n\
        Los Angeles Lakers\n\
        James, LeBron    Probable    Left Foot; Soreness\n";

    #[test]
    fn test_only_entries_under_team_header() {
        let answer = answer_from_text(REPORT, "Denver Nuggets").unwrap();
        assert_eq!(
            answer,
            "Jokic, Nikola | Questionable | Left Ankle; Sprain\nMurray, Jamal | Out | Hamstring"
        );
        assert!(!answer.contains("Tatum"));
        assert!(!answer.contains("James"));
    }

    #[test]
    fn test_team_without_section_is_none() {
        assert_eq!(answer_from_text(REPORT, "Utah Jazz").unwrap(), "NONE");
    }

    #[test]
    fn test_last_section_runs_to_end() {
        assert_eq!(
            answer_from_text(REPORT, "los angeles lakers").unwrap(),
            "James, LeBron | Probable | Left Foot; Soreness"
        );
    }

    #[test]
    fn test_reads_document_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REPORT.as_bytes()).unwrap();

        let question = ReportQuestion::for_team("Boston Celtics");
        let answer = TextSectionRetriever.answer(file.path(), &question).unwrap();
        assert!(answer.starts_with("Tatum, Jayson | Out |"));
    }

    #[test]
    fn test_text_without_team_headers_is_error() {
        let result = answer_from_text("Injury Report: 10/19/26\nNOT YET SUBMITTED\n", "Denver Nuggets");
        assert!(matches!(result, Err(AppError::Document(_))));
    }

    #[test]
    fn test_compressed_pdf_is_decoded() {
        let text = document_text(COMPRESSED_REPORT).unwrap();
        assert!(text.contains("Denver Nuggets"));

        let answer = answer_from_text(&text, "Denver Nuggets").unwrap();
        assert_eq!(
            answer,
            "Murray, Jamal | Out | Hamstring\nJokic, Nikola | Questionable | Left Ankle Sprain"
        );
    }

    #[test]
    fn test_undecodable_pdf_is_error() {
        let result = document_text(b"%PDF-1.7\nnot really a pdf");
        assert!(matches!(result, Err(AppError::Document(_))));
    }

    #[test]
    fn test_missing_document_is_error() {
        let question = ReportQuestion::for_team("Boston Celtics");
        let result = TextSectionRetriever.answer(Path::new("/nonexistent/report.pdf"), &question);
        assert!(result.is_err());
    }
}
