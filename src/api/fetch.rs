//! Authenticated GET with transparent page aggregation.

use serde_json::Value;

use super::http::{page_count, trakt_headers};
use crate::auth::AuthorizedCredential;
use crate::error::{Result, TraktError};

/// Fetches `/users/me/<resource>` documents, optionally following
/// `x-pagination-page-count` to merge every page into one JSON array.
///
/// Non-success statuses are not raised: their bodies come back like any
/// other response and the caller decides what to do with them.
///
/// # Example
/// ```no_run
/// use trakt_backup::api::{build_client, PaginatedFetcher};
/// # async fn example(credential: trakt_backup::auth::AuthorizedCredential) -> trakt_backup::error::Result<()> {
/// let fetcher = PaginatedFetcher::new(build_client()?, "https://api.trakt.tv");
/// let history = fetcher.fetch(&credential, "history?limit=250", true).await?;
/// println!("{history}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PaginatedFetcher {
    client: reqwest::Client,
    base_url: String,
}

/// Aggregated response for one resource.
///
/// `status` is the status of the first page; later pages must all parse as
/// arrays for a merged body to exist at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub status: u16,
    pub body: String,
}

impl FetchedResource {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One response as seen by the fetcher.
#[derive(Debug)]
struct Page {
    status: u16,
    page_count: Option<u32>,
    body: String,
}

impl PaginatedFetcher {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL of a resource path relative to `/users/me/`.
    pub fn resource_url(&self, resource_path: &str) -> String {
        format!(
            "{}/users/me/{}",
            self.base_url,
            resource_path.trim_start_matches('/')
        )
    }

    /// Fetch one resource and return its JSON text.
    ///
    /// With `follow_all_pages` unset, or when the first response reports at
    /// most one page, the first body is returned verbatim. Otherwise pages
    /// `2..=count` are requested with `page=<n>` and all arrays are
    /// concatenated in page order. Any page that is not a JSON array fails
    /// the whole fetch rather than dropping its entries, and an error status
    /// on a later page is reported as [`TraktError::Api`]. An error status
    /// on the first page is passed through like any other body.
    pub async fn fetch(
        &self,
        credential: &AuthorizedCredential,
        resource_path: &str,
        follow_all_pages: bool,
    ) -> Result<String> {
        self.fetch_resource(credential, resource_path, follow_all_pages)
            .await
            .map(|resource| resource.body)
    }

    /// Same as [`fetch`](Self::fetch) but keeps the status of the first
    /// response so callers can refuse to persist error bodies.
    pub async fn fetch_resource(
        &self,
        credential: &AuthorizedCredential,
        resource_path: &str,
        follow_all_pages: bool,
    ) -> Result<FetchedResource> {
        let url = self.resource_url(resource_path);
        let first = self.get_page(credential, &url, None).await?;
        let status = first.status;

        if !follow_all_pages {
            return Ok(FetchedResource {
                status,
                body: first.body,
            });
        }
        let total_pages = match first.page_count {
            Some(count) if count > 1 && (200..300).contains(&status) => count,
            _ => {
                return Ok(FetchedResource {
                    status,
                    body: first.body,
                })
            }
        };

        let mut items = parse_page(&url, 1, &first.body)?;
        for page in 2..=total_pages {
            let next = self.get_page(credential, &url, Some(page)).await?;
            if !(200..300).contains(&next.status) {
                return Err(TraktError::Api {
                    status: next.status,
                    url: url.clone(),
                });
            }
            let entries = parse_page(&url, page, &next.body)?;
            tracing::debug!(url = %url, page, total_pages, entries = entries.len(), "fetched page");
            items.extend(entries);
        }

        tracing::info!(url = %url, total_pages, entries = items.len(), "merged paginated resource");
        Ok(FetchedResource {
            status,
            body: serde_json::to_string(&Value::Array(items))?,
        })
    }

    async fn get_page(
        &self,
        credential: &AuthorizedCredential,
        url: &str,
        page: Option<u32>,
    ) -> Result<Page> {
        let mut request = self
            .client
            .get(url)
            .headers(trakt_headers(credential.access_token(), &credential.client_id));
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }

        let response = request.send().await?;
        let status = response.status();
        let page_count = page_count(response.headers());
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                url = %url,
                page = page.unwrap_or(1),
                status = status.as_u16(),
                "resource request returned non-success status"
            );
        }

        Ok(Page {
            status: status.as_u16(),
            page_count,
            body,
        })
    }
}

fn parse_page(url: &str, page: u32, body: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(TraktError::page_parse(
            url,
            page,
            format!("expected an array, got {}", json_kind(&other)),
        )),
        Err(err) => Err(TraktError::page_parse(url, page, err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_url_joins_under_users_me() {
        let fetcher = PaginatedFetcher::new(reqwest::Client::new(), "https://api.trakt.tv/");
        assert_eq!(
            fetcher.resource_url("watchlist/movies"),
            "https://api.trakt.tv/users/me/watchlist/movies"
        );
        assert_eq!(
            fetcher.resource_url("?extended=full"),
            "https://api.trakt.tv/users/me/?extended=full"
        );
    }

    #[test]
    fn parse_page_rejects_objects_and_garbage() {
        assert!(parse_page("u", 2, "[1,2]").is_ok());
        match parse_page("u", 2, "{\"a\":1}") {
            Err(TraktError::PageParse { page, message, .. }) => {
                assert_eq!(page, 2);
                assert!(message.contains("object"));
            }
            other => panic!("expected PageParse, got {other:?}"),
        }
        assert!(matches!(
            parse_page("u", 3, ""),
            Err(TraktError::PageParse { page: 3, .. })
        ));
    }
}
