//! Trakt resource API: shared HTTP plumbing and the paginated fetcher.

pub mod fetch;
pub mod http;

pub use fetch::{FetchedResource, PaginatedFetcher};
pub use http::build_client;
