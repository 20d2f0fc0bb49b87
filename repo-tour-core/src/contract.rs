//! # contract: capability interfaces and shared data types
//!
//! This module defines the two traits the pipeline is driven through and the plain
//! data types that cross them:
//!
//! - [`RepositoryReader`]: read-only access to a hosted repository (listing, file content).
//! - [`TextGenerator`]: a single free-form text generation call.
//!
//! The pipeline never constructs clients, reads credentials or touches the
//! environment. Callers inject implementations: real HTTP clients in the binary
//! crate, `mockall` mocks in tests.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall` (`MockRepositoryReader`, `MockTextGenerator`),
//!   exported under the `test-export-mocks` feature so downstream crates can use them.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

use crate::error::{ReadError, TourError};

/// Validated `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parses `owner/name`. Exactly one `/`, both halves non-empty.
    pub fn parse(raw: &str) -> Result<Self, TourError> {
        let mut parts = raw.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoId {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(TourError::Validation(raw.to_string())),
        }
    }
}

impl FromStr for RepoId {
    type Err = TourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepoId::parse(s)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One child as returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    /// Slash-separated path relative to the repository root.
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
}

/// One recorded file or directory in a traversal result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub name: String,
    pub kind: EntryKind,
    /// Always 0 for directories.
    pub size: u64,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Number of `/` separators in the path; root children are depth 0.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }
}

impl From<&RemoteEntry> for TreeEntry {
    fn from(remote: &RemoteEntry) -> Self {
        TreeEntry {
            path: remote.path.clone(),
            name: remote.name.clone(),
            kind: remote.kind,
            size: match remote.kind {
                EntryKind::File => remote.size,
                EntryKind::Directory => 0,
            },
        }
    }
}

/// Error type for [`TextGenerator`] (simple boxed error, as for other adapters).
pub type GenerateError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only access to a hosted repository.
///
/// Implementors own transport, authentication and rate limiting. Paths are
/// slash-separated and relative to the repository root; `""` is the root.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RepositoryReader: Send + Sync {
    /// Confirm the repository exists and is readable with the current credentials.
    async fn check_repository(&self, repo: &RepoId) -> Result<(), ReadError>;

    /// Raw bytes of the file at `path`.
    async fn get_file_content(&self, repo: &RepoId, path: &str) -> Result<Vec<u8>, ReadError>;

    /// Immediate children of the directory at `path`, in the host's listing order.
    async fn list_directory(
        &self,
        repo: &RepoId,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, ReadError>;
}

/// A single prompt-in, text-out generation call. Output carries no schema guarantee.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}
