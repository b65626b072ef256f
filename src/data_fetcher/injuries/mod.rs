//! Injury report discovery, download, and team-scoped extraction.
//!
//! The league republishes its report several times a day under a predictable
//! name. Discovery walks back from today through the known publication slots
//! and keeps the first document that downloads; the document is then handed to
//! a [`DocumentRetriever`] with a question scoped to one team.

pub mod answers;
pub mod retriever;

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use lru::LruCache;
use reqwest::Client;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::constants::{cache, injury};
use crate::data_fetcher::api::{build_injury_report_url, create_http_client_with_timeout};
use crate::data_fetcher::models::{FetchOutcome, InjuryEntry, Unavailable};
use crate::error::AppError;

pub use answers::{NO_ENTRIES, ReportQuestion, format_injury_answer, parse_injury_answer};
pub use retriever::{DocumentRetriever, TextSectionRetriever, answer_from_text};

/// Lifecycle of one report lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPhase {
    Idle,
    Downloading,
    Downloaded,
    Extracted,
    Answered,
    Failed,
}

impl fmt::Display for ReportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportPhase::Idle => "idle",
            ReportPhase::Downloading => "downloading",
            ReportPhase::Downloaded => "downloaded",
            ReportPhase::Extracted => "extracted",
            ReportPhase::Answered => "answered",
            ReportPhase::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A downloaded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub url: String,
    pub date: NaiveDate,
    pub slot: &'static str,
    pub path: PathBuf,
}

/// One (date, slot) candidate in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCandidate {
    pub date: NaiveDate,
    pub slot: &'static str,
    pub url: String,
}

/// Every candidate URL for `today`: newest day first, slots latest first.
pub fn candidate_reports(report_domain: &str, today: NaiveDate) -> Vec<ReportCandidate> {
    (0..injury::LOOKBACK_DAYS)
        .map(|days_back| today - ChronoDuration::days(days_back))
        .flat_map(|date| {
            let day = date.format("%Y-%m-%d").to_string();
            injury::TIME_SLOTS.into_iter().map(move |slot| ReportCandidate {
                date,
                slot,
                url: build_injury_report_url(report_domain, &day, slot),
            })
        })
        .collect()
}

type AnswerKey = (String, String);

static SAVE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Finds the current injury report and answers team-scoped questions about it.
pub struct InjuryReports {
    client: Client,
    report_domain: String,
    download_dir: PathBuf,
    retriever: Arc<dyn DocumentRetriever>,
    answers: Mutex<LruCache<AnswerKey, Vec<InjuryEntry>>>,
}

impl fmt::Debug for InjuryReports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjuryReports")
            .field("report_domain", &self.report_domain)
            .field("download_dir", &self.download_dir)
            .finish_non_exhaustive()
    }
}

impl InjuryReports {
    pub fn new(
        report_domain: &str,
        download_dir: PathBuf,
        timeout: Duration,
        retriever: Arc<dyn DocumentRetriever>,
    ) -> Result<Self, AppError> {
        let capacity =
            NonZeroUsize::new(cache::INJURY_ANSWER_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            client: create_http_client_with_timeout(timeout)?,
            report_domain: report_domain.trim_end_matches('/').to_string(),
            download_dir,
            retriever,
            answers: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Uses the configured domain, timeout, and `{data_dir}/injury_reports`.
    pub fn from_config(
        config: &Config,
        retriever: Arc<dyn DocumentRetriever>,
    ) -> Result<Self, AppError> {
        Self::new(
            &config.injury_report_domain,
            config.data_dir().join("injury_reports"),
            Duration::from_secs(config.injury_timeout_seconds),
            retriever,
        )
    }

    /// Injury entries listed under `team` in the current report.
    pub async fn team_injuries(&self, team: &str) -> FetchOutcome<Vec<InjuryEntry>> {
        self.team_injuries_on(team, Local::now().date_naive()).await
    }

    /// Like [`team_injuries`](Self::team_injuries) with discovery anchored at `today`.
    #[instrument(skip(self))]
    pub async fn team_injuries_on(
        &self,
        team: &str,
        today: NaiveDate,
    ) -> FetchOutcome<Vec<InjuryEntry>> {
        match self.report_on(today).await {
            Ok(document) => self.answer_for(&document, team).await,
            Err(reason) => FetchOutcome::unavailable(reason),
        }
    }

    /// The newest report in the lookback window, downloaded once so several
    /// teams can be answered from it.
    pub async fn report_on(&self, today: NaiveDate) -> Result<ReportDocument, Unavailable> {
        match self.discover(today).await {
            Ok(Some(document)) => Ok(document),
            Ok(None) => Err(Unavailable::ReportUnavailable),
            Err(e) => Err(e.into()),
        }
    }

    /// Answers for one team from an already downloaded report.
    #[instrument(skip(self, document), fields(url = %document.url))]
    pub async fn answer_for(
        &self,
        document: &ReportDocument,
        team: &str,
    ) -> FetchOutcome<Vec<InjuryEntry>> {
        let mut phase = ReportPhase::Downloaded;

        let question = ReportQuestion::for_team(team);
        let key = (document.url.clone(), question.team.clone());
        if let Some(entries) = self.answers.lock().await.get(&key) {
            debug!("Using cached injury answer for {} from {}", key.1, key.0);
            advance(&mut phase, ReportPhase::Answered);
            return FetchOutcome::Success(entries.clone());
        }

        let answer = match self.ask(document, question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Document retriever failed for {}: {e}", document.url);
                advance(&mut phase, ReportPhase::Failed);
                return FetchOutcome::unavailable(e);
            }
        };
        advance(&mut phase, ReportPhase::Extracted);

        let entries = parse_injury_answer(&answer);
        self.answers.lock().await.put(key, entries.clone());
        advance(&mut phase, ReportPhase::Answered);
        FetchOutcome::Success(entries)
    }

    /// Tries each candidate once; the first 2xx response is saved and returned.
    /// `Ok(None)` when every candidate failed.
    pub async fn discover(&self, today: NaiveDate) -> Result<Option<ReportDocument>, AppError> {
        let mut phase = ReportPhase::Idle;
        advance(&mut phase, ReportPhase::Downloading);
        let candidates = candidate_reports(&self.report_domain, today);
        let total = candidates.len();

        for (attempt, candidate) in candidates.into_iter().enumerate() {
            debug!("Trying injury report {}/{}: {}", attempt + 1, total, candidate.url);

            let response = match self.client.get(&candidate.url).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    debug!("Report {} answered {}", candidate.url, response.status());
                    continue;
                }
                Err(e) => {
                    debug!("Report {} failed: {e}", candidate.url);
                    continue;
                }
            };

            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("Reading report {} failed: {e}", candidate.url);
                    continue;
                }
            };

            let path = match self.save(&candidate, &body).await {
                Ok(path) => path,
                Err(e) => {
                    advance(&mut phase, ReportPhase::Failed);
                    return Err(e);
                }
            };
            advance(&mut phase, ReportPhase::Downloaded);
            info!(
                "Found injury report for {} {} ({} bytes)",
                candidate.date,
                candidate.slot,
                body.len()
            );
            return Ok(Some(ReportDocument {
                url: candidate.url,
                date: candidate.date,
                slot: candidate.slot,
                path,
            }));
        }

        warn!("No injury report found in the last {total} publication slots");
        advance(&mut phase, ReportPhase::Failed);
        Ok(None)
    }

    async fn save(&self, candidate: &ReportCandidate, body: &[u8]) -> Result<PathBuf, AppError> {
        let file_name = candidate
            .url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("injury-report.pdf");
        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(file_name);

        // Readers of an earlier copy must never see a truncated file
        let sequence = SAVE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let temp = self
            .download_dir
            .join(format!("{file_name}.tmp-{}-{sequence}", std::process::id()));
        tokio::fs::write(&temp, body).await?;
        tokio::fs::rename(&temp, &path).await?;
        Ok(path)
    }

    async fn ask(
        &self,
        document: &ReportDocument,
        question: ReportQuestion,
    ) -> Result<String, AppError> {
        let retriever = Arc::clone(&self.retriever);
        let path = document.path.clone();
        tokio::task::spawn_blocking(move || retriever.answer(&path, &question))
            .await
            .map_err(|e| AppError::document_error(format!("document retriever panicked: {e}")))?
    }
}

fn advance(phase: &mut ReportPhase, next: ReportPhase) {
    debug!("Injury report phase: {phase} -> {next}");
    *phase = next;
}
