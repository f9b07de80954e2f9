//! Backing up every `/users/me/` resource to a blob store.

pub mod resources;
pub mod runner;
pub mod store;

pub use resources::{resource_file_name, Resource, RESOURCES};
pub use runner::{BackupOptions, BackupReport, BackupRunner, ResourceOutcome};
pub use store::{BlobStore, DirectoryStore, FolderId, WriteOutcome};
