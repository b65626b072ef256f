//! HTTP client creation and configuration utilities

use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HOST, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Headers mimicking a browser session. The stats provider tends to stall
/// requests that do not carry them.
pub fn browser_headers(api_domain: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));

    if let Some(host) = host_of(api_domain)
        && let Ok(value) = HeaderValue::from_str(host)
    {
        headers.insert(HOST, value);
    }
    headers
}

/// Extracts `host[:port]` from a base URL.
fn host_of(api_domain: &str) -> Option<&str> {
    let without_scheme = api_domain
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(api_domain);
    without_scheme
        .split('/')
        .next()
        .filter(|host| !host.is_empty())
}

/// Creates the stats provider client with browser headers, connection pooling
/// and a per-request timeout.
pub fn create_stats_client(api_domain: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    create_client(browser_headers(api_domain), timeout)
}

/// Creates a plain client with a request timeout, used for document downloads
/// and the analysis gateway.
pub fn create_http_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    create_client(HeaderMap::new(), timeout)
}

fn create_client(headers: HeaderMap, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .build()
}
