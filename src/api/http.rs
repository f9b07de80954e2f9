//! HTTP client construction and Trakt header helpers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// Header carrying the API version on every resource request.
pub const API_VERSION_HEADER: &str = "trakt-api-version";
/// Header carrying the client id on every resource request.
pub const API_KEY_HEADER: &str = "trakt-api-key";
/// Response header with the total number of pages of a listing.
pub const PAGE_COUNT_HEADER: &str = "x-pagination-page-count";

const API_VERSION: &str = "2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the HTTP client used for auth and resource calls.
///
/// Transport timeouts live here; the auth and fetch layers do not add their
/// own.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("trakt-backup/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Build the headers required by authenticated Trakt API calls.
pub fn trakt_headers(access_token: &str, client_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    if let Ok(val) = HeaderValue::from_str(client_id) {
        headers.insert(API_KEY_HEADER, val);
    }
    headers
}

/// Read the page count header as a number.
///
/// Returns `None` when the header is missing or not a decimal integer.
pub fn page_count(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(PAGE_COUNT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
