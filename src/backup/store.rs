//! Destination for backed-up documents.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, TraktError};

/// Opaque handle to a folder inside a [`BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderId(String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether a write replaced an existing file or made a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
}

/// Named-blob storage with find-or-create semantics.
///
/// Names are looked up inside their parent folder; writing to a name that
/// already exists replaces its content.
pub trait BlobStore: Send + Sync {
    fn root(&self) -> FolderId;
    fn find_or_create_folder(&self, parent: &FolderId, name: &str) -> Result<FolderId>;
    fn write_file(&self, folder: &FolderId, name: &str, content: &str) -> Result<WriteOutcome>;
}

/// [`BlobStore`] backed by a directory on the local filesystem.
///
/// Folder ids are paths relative to the root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, folder: &FolderId) -> PathBuf {
        if folder.as_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(folder.as_str())
        }
    }
}

impl BlobStore for DirectoryStore {
    fn root(&self) -> FolderId {
        FolderId::new("")
    }

    fn find_or_create_folder(&self, parent: &FolderId, name: &str) -> Result<FolderId> {
        validate_name(name)?;
        let path = self.resolve(parent).join(name);
        if !path.is_dir() {
            fs::create_dir_all(&path)?;
            tracing::info!(folder = %path.display(), "created folder");
        }
        let id = if parent.as_str().is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", parent.as_str())
        };
        Ok(FolderId::new(id))
    }

    fn write_file(&self, folder: &FolderId, name: &str, content: &str) -> Result<WriteOutcome> {
        validate_name(name)?;
        let dir = self.resolve(folder);
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        let outcome = if path.is_file() {
            WriteOutcome::Updated
        } else {
            WriteOutcome::Created
        };
        replace_file(&path, content.as_bytes())?;
        match outcome {
            WriteOutcome::Updated => tracing::info!(file = %path.display(), "updated existing file"),
            WriteOutcome::Created => tracing::info!(file = %path.display(), "created new file"),
        }
        Ok(outcome)
    }
}

/// Names come from server data (list slugs), so refuse anything that could
/// step outside the folder.
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(TraktError::Storage(format!("invalid file name: {name:?}")));
    }
    Ok(())
}

fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| TraktError::Storage(format!("{} has no file name", path.display())))?;
    let temp_path = path.with_file_name(format!(
        ".{}.tmp-{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();
    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}
