//! Typed results for every retrieval operation.

use serde::Serialize;
use thiserror::Error;

use crate::error::AppError;

/// Why an upstream source could not supply data.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Unavailable {
    #[error("provider timed out: {url}")]
    Timeout { url: String },

    #[error("provider error: {0}")]
    Upstream(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("injury report unavailable")]
    ReportUnavailable,
}

impl From<AppError> for Unavailable {
    fn from(error: AppError) -> Self {
        match error {
            AppError::NetworkTimeout { url } => Unavailable::Timeout { url },
            AppError::MissingColumn { table, column } => {
                Unavailable::MissingField(format!("{table}.{column}"))
            }
            other => Unavailable::Upstream(other.to_string()),
        }
    }
}

/// A query that succeeded but matched nothing. A valid business answer.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmptyResult {
    #[error("no matchup yet against {opponent} in {season}")]
    NoMatchup { opponent: String, season: String },

    #[error("no game found on {date}")]
    NoGameOnDate { date: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum FetchOutcome<T> {
    Success(T),
    Empty(EmptyResult),
    NotFound(String),
    Unavailable(Unavailable),
}

impl<T> FetchOutcome<T> {
    pub fn unavailable(reason: impl Into<Unavailable>) -> Self {
        FetchOutcome::Unavailable(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchOutcome::Unavailable(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_success(&self) -> Option<&T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        self.and_then(|value| FetchOutcome::Success(f(value)))
    }

    /// Chains a dependent step. Non-success variants pass through untouched.
    pub fn and_then<U, F: FnOnce(T) -> FetchOutcome<U>>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(value) => f(value),
            FetchOutcome::Empty(empty) => FetchOutcome::Empty(empty),
            FetchOutcome::NotFound(what) => FetchOutcome::NotFound(what),
            FetchOutcome::Unavailable(reason) => FetchOutcome::Unavailable(reason),
        }
    }

    /// Pairs two outcomes. The first non-success one wins.
    pub fn zip<U>(self, other: FetchOutcome<U>) -> FetchOutcome<(T, U)> {
        self.and_then(|left| other.map(|right| (left, right)))
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Success(_) => "ok",
            FetchOutcome::Empty(_) => "empty",
            FetchOutcome::NotFound(_) => "not found",
            FetchOutcome::Unavailable(_) => "unavailable",
        }
    }

    /// Human-readable reason for a non-success outcome.
    pub fn reason(&self) -> Option<String> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Empty(empty) => Some(empty.to_string()),
            FetchOutcome::NotFound(what) => Some(format!("{what} could not be found")),
            FetchOutcome::Unavailable(reason) => Some(reason.to_string()),
        }
    }
}

impl<T> From<Result<T, AppError>> for FetchOutcome<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => FetchOutcome::Success(value),
            Err(e) => FetchOutcome::Unavailable(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error_maps_to_timeout() {
        let reason: Unavailable = AppError::network_timeout("https://stats.example.com/x").into();
        assert_eq!(
            reason,
            Unavailable::Timeout {
                url: "https://stats.example.com/x".to_string()
            }
        );
    }

    #[test]
    fn test_missing_column_maps_to_missing_field() {
        let reason: Unavailable = AppError::missing_column("Standings", "WINS").into();
        assert_eq!(reason, Unavailable::MissingField("Standings.WINS".into()));
    }

    #[test]
    fn test_and_then_passes_failures_through() {
        let unavailable: FetchOutcome<i32> = FetchOutcome::unavailable(Unavailable::ReportUnavailable);
        let chained = unavailable.and_then(|v| FetchOutcome::Success(v + 1));
        assert!(chained.is_unavailable());

        let empty: FetchOutcome<i32> = FetchOutcome::Empty(EmptyResult::NoGameOnDate {
            date: "2026-01-02".into(),
        });
        assert_eq!(empty.clone().map(|v| v * 2), empty);
        assert_eq!(FetchOutcome::Success(2).map(|v| v * 2), FetchOutcome::Success(4));
    }

    #[test]
    fn test_empty_is_distinct_from_unavailable_and_not_found() {
        let empty: FetchOutcome<()> = FetchOutcome::Empty(EmptyResult::NoMatchup {
            opponent: "BOS".into(),
            season: "2025-26".into(),
        });
        assert_eq!(empty.label(), "empty");
        assert!(!empty.is_unavailable());
        assert_eq!(
            empty.reason().unwrap(),
            "no matchup yet against BOS in 2025-26"
        );

        let missing: FetchOutcome<()> = FetchOutcome::NotFound("Player 'Nobody'".into());
        assert_eq!(missing.label(), "not found");
    }

    #[test]
    fn test_serializes_with_outcome_tag() {
        let outcome: FetchOutcome<u8> = FetchOutcome::unavailable(Unavailable::ReportUnavailable);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "unavailable");
        assert_eq!(json["data"]["kind"], "report_unavailable");
    }
}
