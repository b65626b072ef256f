//! Resilient fetching from the stats provider: caching, bounded retries on
//! timeouts, pacing of the heavy league-wide calls, and table extraction.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::http_client::create_stats_client;
use super::urls::{Endpoint, QueryParams, build_endpoint_url};
use crate::config::Config;
use crate::constants::{cache, retry};
use crate::data_fetcher::cache::ResponseCache;
use crate::data_fetcher::models::{FetchOutcome, StatTable, Unavailable};
use crate::error::AppError;

/// Timing knobs for provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Per-attempt read timeout
    pub timeout: Duration,
    /// Attempts per call, first one included
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Minimum spacing between two heavy calls
    pub pacing_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS),
            max_attempts: retry::MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(retry::RETRY_DELAY_MS),
            pacing_delay: Duration::from_millis(retry::PACING_DELAY_MS),
        }
    }
}

impl FetchPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.http_timeout_seconds),
            ..Self::default()
        }
    }

    /// Millisecond-scale policy for tests against a local mock server.
    pub fn fast(timeout: Duration) -> Self {
        Self {
            timeout,
            max_attempts: retry::MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(10),
            pacing_delay: Duration::from_millis(10),
        }
    }
}

/// Wire shape shared by all provider endpoints. Most answer with a
/// `resultSets` array; the leaders endpoint uses a single `resultSet`.
#[derive(Debug, Deserialize)]
struct ProviderEnvelope {
    #[serde(rename = "resultSets", default)]
    result_sets: Vec<RawResultSet>,
    #[serde(rename = "resultSet", default)]
    result_set: Option<RawResultSet>,
}

#[derive(Debug, Deserialize)]
struct RawResultSet {
    #[serde(default)]
    name: String,
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<Value>>,
}

/// Single point of contact with the stats provider.
///
/// Every call goes through the response cache first. Misses are fetched with
/// up to `max_attempts` attempts, retrying only when the attempt timed out.
/// Failures are never cached.
#[derive(Debug)]
pub struct FetchGateway {
    client: Client,
    api_domain: String,
    policy: FetchPolicy,
    cache: ResponseCache,
    last_heavy_call: Mutex<Option<Instant>>,
}

impl FetchGateway {
    pub fn new(api_domain: &str, policy: FetchPolicy) -> Result<Self, AppError> {
        let client = create_stats_client(api_domain, policy.timeout)?;
        Ok(Self {
            client,
            api_domain: api_domain.trim_end_matches('/').to_string(),
            policy,
            cache: ResponseCache::new(cache::HTTP_RESPONSE_CAPACITY, cache::HTTP_RESPONSE_SECONDS),
            last_heavy_call: Mutex::new(None),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(&config.stats_api_domain, FetchPolicy::from_config(config))
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetches one endpoint and extracts its result table.
    #[instrument(skip(self, params), fields(endpoint = endpoint.path()))]
    pub async fn fetch_table(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
    ) -> FetchOutcome<StatTable> {
        let url = match build_endpoint_url(&self.api_domain, endpoint, params) {
            Ok(url) => url,
            Err(message) => {
                error!("Could not build request URL: {message}");
                return FetchOutcome::unavailable(Unavailable::Upstream(message));
            }
        };

        self.fetch_table_from_url(endpoint, &url).await.into()
    }

    async fn fetch_table_from_url(
        &self,
        endpoint: Endpoint,
        url: &str,
    ) -> Result<StatTable, AppError> {
        if let Some(cached) = self.cache.get(url).await {
            debug!("Using cached HTTP response for URL: {url}");
            match parse_result_table(&cached, endpoint.result_set(), url) {
                Ok(table) => return Ok(table),
                Err(e) => warn!("Failed to parse cached response for URL {url}: {e}"),
            }
        }

        if endpoint.is_heavy() {
            self.pace().await;
        }

        let body = self.fetch_text(url).await?;
        let table = parse_result_table(&body, endpoint.result_set(), url)?;
        // Cache only payloads that produced a table
        self.cache.put(url.to_string(), body).await;
        Ok(table)
    }

    /// Waits until at least `pacing_delay` has passed since the previous heavy call.
    async fn pace(&self) {
        let mut last = self.last_heavy_call.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.policy.pacing_delay {
                let wait = self.policy.pacing_delay - elapsed;
                debug!("Pacing heavy provider call for {wait:?}");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// GETs a URL and returns the body, retrying only on read timeouts.
    /// Sending the request and reading its body count as one attempt.
    #[instrument(skip(self))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, AppError> {
        info!("Fetching data from URL: {url}");

        let mut attempt = 1u32;
        loop {
            match self.fetch_once(url).await {
                Ok(text) => return Ok(text),
                Err(AppError::NetworkTimeout { .. }) if attempt < self.policy.max_attempts => {
                    warn!(
                        "Timed out fetching {}. Retrying in {:?} (attempt {}/{})",
                        url, self.policy.retry_delay, attempt, self.policy.max_attempts
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Request failed for URL {url} after {attempt} attempt(s): {e}");
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_request_error(e, url))?;

        let status = response.status();
        debug!("Response status: {status}");

        if !status.is_success() {
            let status_code = status.as_u16();
            let reason = status.canonical_reason().unwrap_or("Unknown error");

            error!("HTTP {} - {} (URL: {})", status_code, reason, url);

            return Err(match status_code {
                404 => AppError::api_not_found(url),
                429 => AppError::api_rate_limit(reason, url),
                400..=499 => AppError::api_client_error(status_code, reason, url),
                502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
                _ => AppError::api_server_error(status_code, reason, url),
            });
        }

        // Body reads are bounded by the same timeout
        let text = response
            .text()
            .await
            .map_err(|e| classify_request_error(e, url))?;
        debug!("Response length: {} bytes", text.len());
        Ok(text)
    }
}

fn classify_request_error(e: reqwest::Error, url: &str) -> AppError {
    if e.is_timeout() {
        AppError::network_timeout(url)
    } else if e.is_connect() {
        AppError::network_connection(url, e.to_string())
    } else {
        AppError::ApiFetch(e)
    }
}

/// Extracts one result table from a provider body. With `wanted == None` the
/// first table is used.
pub fn parse_result_table(
    body: &str,
    wanted: Option<&str>,
    url: &str,
) -> Result<StatTable, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::api_no_data("Response body is empty", url));
    }

    let envelope: ProviderEnvelope = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse API response: {} (URL: {})", e, url);
        if !body.trim_start().starts_with('{') && !body.trim_start().starts_with('[') {
            AppError::api_malformed_json("Response is not valid JSON", url)
        } else {
            AppError::api_unexpected_structure(e.to_string(), url)
        }
    })?;

    let mut sets = envelope.result_sets;
    sets.extend(envelope.result_set);

    let position = match wanted {
        Some(name) => sets.iter().position(|set| set.name == name),
        None => (!sets.is_empty()).then_some(0),
    };
    let Some(position) = position else {
        let what = wanted.unwrap_or("any result set");
        return Err(AppError::api_unexpected_structure(
            format!("response has no '{what}'"),
            url,
        ));
    };

    let raw = sets.swap_remove(position);
    StatTable::try_new(raw.name, raw.headers, raw.row_set)
        .map_err(|message| AppError::api_unexpected_structure(message, url))
}
