//! Sequential backup of every resource plus the user's lists.

use std::sync::Arc;

use serde_json::Value;

use super::resources::{Resource, LISTS_FOLDER, LISTS_PATH, RESOURCES};
use super::store::{BlobStore, FolderId, WriteOutcome};
use crate::api::PaginatedFetcher;
use crate::auth::AuthorizedCredential;
use crate::error::{Result, TraktError};

/// Knobs for a backup run.
#[derive(Debug, Clone, Copy)]
pub struct BackupOptions {
    /// Follow `x-pagination-page-count` on listing endpoints.
    pub follow_all_pages: bool,
    /// Back up each custom list with its items and comments.
    pub include_lists: bool,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            follow_all_pages: true,
            include_lists: true,
        }
    }
}

/// Result of backing up one document.
#[derive(Debug)]
pub struct ResourceOutcome {
    /// File name the document was (or would have been) written to.
    pub name: String,
    pub result: std::result::Result<WriteOutcome, TraktError>,
}

/// Per-document results of a run, in the order they were attempted.
#[derive(Debug, Default)]
pub struct BackupReport {
    pub outcomes: Vec<ResourceOutcome>,
}

impl BackupReport {
    fn record(&mut self, name: impl Into<String>, result: std::result::Result<WriteOutcome, TraktError>) {
        let name = name.into();
        match &result {
            Ok(outcome) => tracing::debug!(file = %name, ?outcome, "backed up"),
            Err(err) => tracing::error!(file = %name, error = %err, "backup failed"),
        }
        self.outcomes.push(ResourceOutcome { name, result });
    }

    pub fn created(&self) -> usize {
        self.count(WriteOutcome::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(WriteOutcome::Updated)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &TraktError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Err(err) => Some((outcome.name.as_str(), err)),
            Ok(_) => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, wanted: WriteOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.result, Ok(found) if found == wanted))
            .count()
    }
}

/// Fetches every resource with one credential and writes it to a
/// [`BlobStore`].
///
/// Resources are fetched one after another. A failed resource is recorded in
/// the report and the run moves on; only errors that would fail every
/// following request (see [`TraktError::is_fatal`]) abort the run.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use trakt_backup::api::{build_client, PaginatedFetcher};
/// use trakt_backup::backup::{BackupOptions, BackupRunner, DirectoryStore};
///
/// # async fn example(credential: trakt_backup::auth::AuthorizedCredential) -> trakt_backup::error::Result<()> {
/// let fetcher = PaginatedFetcher::new(build_client()?, "https://api.trakt.tv");
/// let runner = BackupRunner::new(
///     fetcher,
///     Arc::new(DirectoryStore::new("backup")),
///     BackupOptions::default(),
/// );
/// let report = runner.run(&credential).await?;
/// println!("{} created, {} updated", report.created(), report.updated());
/// # Ok(())
/// # }
/// ```
pub struct BackupRunner {
    fetcher: PaginatedFetcher,
    store: Arc<dyn BlobStore>,
    options: BackupOptions,
}

impl BackupRunner {
    pub fn new(fetcher: PaginatedFetcher, store: Arc<dyn BlobStore>, options: BackupOptions) -> Self {
        Self {
            fetcher,
            store,
            options,
        }
    }

    pub async fn run(&self, credential: &AuthorizedCredential) -> Result<BackupReport> {
        let mut report = BackupReport::default();
        let root = self.store.root();

        for resource in RESOURCES {
            match self.backup_resource(credential, &root, resource).await {
                Err(err) if err.is_fatal() => return Err(err),
                result => report.record(resource.file_name(), result),
            }
        }

        if self.options.include_lists {
            self.backup_lists(credential, &root, &mut report).await?;
        }

        tracing::info!(
            created = report.created(),
            updated = report.updated(),
            failed = report.failed(),
            "backup finished"
        );
        Ok(report)
    }

    async fn backup_resource(
        &self,
        credential: &AuthorizedCredential,
        root: &FolderId,
        resource: &Resource,
    ) -> Result<WriteOutcome> {
        let follow = self.options.follow_all_pages && resource.paginated;
        let body = self.fetch_ok(credential, resource.path, follow).await?;
        self.store.write_file(root, &resource.file_name(), &body)
    }

    async fn backup_lists(
        &self,
        credential: &AuthorizedCredential,
        root: &FolderId,
        report: &mut BackupReport,
    ) -> Result<()> {
        let lists = match self.list_index(credential).await {
            Ok(lists) => lists,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                report.record(LISTS_PATH, Err(err));
                return Ok(());
            }
        };

        let folder = match self.store.find_or_create_folder(root, LISTS_FOLDER) {
            Ok(folder) => folder,
            Err(err) => {
                report.record(LISTS_FOLDER, Err(err));
                return Ok(());
            }
        };

        tracing::info!(lists = lists.len(), "backing up lists");
        for (index, list) in lists.into_iter().enumerate() {
            let label = list_slug(&list)
                .map(|slug| format!("{LISTS_FOLDER}/{slug}.json"))
                .unwrap_or_else(|_| format!("{LISTS_FOLDER}/#{index}"));
            match self.backup_list(credential, &folder, list).await {
                Err(err) if err.is_fatal() => return Err(err),
                result => report.record(label, result),
            }
        }
        Ok(())
    }

    async fn list_index(&self, credential: &AuthorizedCredential) -> Result<Vec<Value>> {
        let body = self
            .fetch_ok(credential, LISTS_PATH, self.options.follow_all_pages)
            .await?;
        match serde_json::from_str::<Value>(&body)? {
            Value::Array(lists) => Ok(lists),
            _ => Err(TraktError::InvalidList(
                "lists response is not an array".to_string(),
            )),
        }
    }

    /// Attach items and comments to a list entry and write it as
    /// `<slug>.json`. Nothing is written unless both parts parse.
    async fn backup_list(
        &self,
        credential: &AuthorizedCredential,
        folder: &FolderId,
        mut list: Value,
    ) -> Result<WriteOutcome> {
        let slug = list_slug(&list)?.to_string();
        let follow = self.options.follow_all_pages;

        let items = self
            .fetch_json(credential, &format!("{LISTS_PATH}/{slug}/items"), follow)
            .await?;
        let comments = self
            .fetch_json(credential, &format!("{LISTS_PATH}/{slug}/comments"), follow)
            .await?;

        let entry = list
            .as_object_mut()
            .ok_or_else(|| TraktError::InvalidList(format!("list {slug} is not an object")))?;
        entry.insert("items".to_string(), items);
        entry.insert("comments".to_string(), comments);

        let content = serde_json::to_string(&list)?;
        self.store.write_file(folder, &format!("{slug}.json"), &content)
    }

    async fn fetch_json(
        &self,
        credential: &AuthorizedCredential,
        path: &str,
        follow: bool,
    ) -> Result<Value> {
        let body = self.fetch_ok(credential, path, follow).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch a resource and refuse error statuses, so an error body never
    /// overwrites a previous good backup.
    async fn fetch_ok(
        &self,
        credential: &AuthorizedCredential,
        path: &str,
        follow: bool,
    ) -> Result<String> {
        let resource = self.fetcher.fetch_resource(credential, path, follow).await?;
        if !resource.is_success() {
            return Err(TraktError::Api {
                status: resource.status,
                url: self.fetcher.resource_url(path),
            });
        }
        Ok(resource.body)
    }
}

fn list_slug(list: &Value) -> Result<&str> {
    list.get("ids")
        .and_then(|ids| ids.get("slug"))
        .and_then(Value::as_str)
        .filter(|slug| !slug.is_empty())
        .ok_or_else(|| TraktError::InvalidList("list entry has no ids.slug".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_slug_reads_nested_ids() {
        let list = json!({"name": "Favourites", "ids": {"trakt": 1, "slug": "favourites"}});
        assert_eq!(list_slug(&list).unwrap(), "favourites");
    }

    #[test]
    fn list_slug_missing_is_invalid_list() {
        assert!(matches!(
            list_slug(&json!({"name": "broken", "ids": {}})),
            Err(TraktError::InvalidList(_))
        ));
        assert!(list_slug(&json!({"ids": {"slug": ""}})).is_err());
    }

    #[test]
    fn report_counts_outcomes() {
        let mut report = BackupReport::default();
        report.record("a.json", Ok(WriteOutcome::Created));
        report.record("b.json", Ok(WriteOutcome::Updated));
        report.record("c.json", Ok(WriteOutcome::Updated));
        report.record("d.json", Err(TraktError::Storage("disk full".into())));

        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        let (name, _) = report.failures().next().unwrap();
        assert_eq!(name, "d.json");
    }
}
