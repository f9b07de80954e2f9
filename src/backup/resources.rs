//! Catalogue of `/users/me/` resources included in a backup.

/// One resource path under `/users/me/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub path: &'static str,
    /// Listing endpoints that may answer with several pages.
    pub paginated: bool,
}

impl Resource {
    const fn object(path: &'static str) -> Self {
        Self {
            path,
            paginated: false,
        }
    }

    const fn listing(path: &'static str) -> Self {
        Self {
            path,
            paginated: true,
        }
    }

    pub fn file_name(&self) -> String {
        resource_file_name(self.path)
    }
}

/// Path of the lists index; each list is backed up separately.
pub const LISTS_PATH: &str = "lists";
/// Folder holding one file per list.
pub const LISTS_FOLDER: &str = "lists";

pub const RESOURCES: &[Resource] = &[
    Resource::object("?extended=full"),
    Resource::listing("collection/movies?extended=metadata"),
    Resource::listing("collection/shows?extended=metadata"),
    Resource::listing("comments/all?include_replies=true"),
    Resource::listing("followers"),
    Resource::listing("following"),
    Resource::listing("friends"),
    Resource::listing("history?limit=250"),
    Resource::listing("ratings/episodes"),
    Resource::listing("ratings/movies"),
    Resource::listing("ratings/seasons"),
    Resource::listing("ratings/shows"),
    Resource::listing("recommendations"),
    Resource::object("stats"),
    Resource::listing("watched/movies"),
    Resource::listing("watched/shows"),
    Resource::listing("watchlist/episodes"),
    Resource::listing("watchlist/movies"),
    Resource::listing("watchlist/seasons"),
    Resource::listing("watchlist/shows"),
];

/// File name for a resource path: query dropped, `/` turned into `_`.
///
/// The bare-query profile path (`?extended=full`) becomes `profile.json`.
pub fn resource_file_name(path: &str) -> String {
    let without_query = path.split('?').next().unwrap_or_default();
    let stem = without_query.trim_matches('/').replace('/', "_");
    if stem.is_empty() {
        "profile.json".to_string()
    } else {
        format!("{stem}.json")
    }
}
