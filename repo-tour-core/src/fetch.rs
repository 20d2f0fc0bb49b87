//! Bounded-depth traversal of a remote repository tree.
//!
//! Directories are listed level by level from an explicit worklist. Siblings on
//! one level are listed concurrently (capped by [`TraversalConfig::concurrency`]),
//! then the collected listings are walked once more to produce a deterministic
//! pre-order entry list: parent before children, siblings in listing order.
//!
//! A root that does not exist (an empty repository) yields an empty tree. Any other
//! failure to list the root aborts the traversal. A failure to list any other
//! directory drops that subtree and is reported in [`FetchedTree::skipped`].

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::{TraversalConfig, ROOT_HIDDEN_ALLOW_LIST};
use crate::contract::{EntryKind, RemoteEntry, RepoId, RepositoryReader, TreeEntry};
use crate::error::{ReadError, TourError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Listing(ReadError),
    /// The traversal's request budget ran out before this directory was listed.
    BudgetExhausted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Listing(e) => write!(f, "{e}"),
            SkipReason::BudgetExhausted => write!(f, "request budget exhausted"),
        }
    }
}

/// A directory that was recorded but whose contents are missing from the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDirectory {
    pub path: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct FetchedTree {
    pub entries: Vec<TreeEntry>,
    pub skipped: Vec<SkippedDirectory>,
}

/// Traverse `repo` from the root down to `config.max_depth`.
pub async fn fetch<R>(
    reader: &R,
    repo: &RepoId,
    config: &TraversalConfig,
) -> Result<FetchedTree, TourError>
where
    R: RepositoryReader + ?Sized,
{
    info!(
        repo = %repo,
        max_depth = config.max_depth,
        skip_names = config.skip_names.len(),
        "Fetching repository tree"
    );

    let budget = config.max_requests.max(1);
    let mut requests = 0usize;
    let mut listings: HashMap<String, Vec<RemoteEntry>> = HashMap::new();
    let mut skipped: Vec<SkippedDirectory> = Vec::new();
    let mut frontier: Vec<(String, usize)> = vec![(String::new(), 0)];

    while !frontier.is_empty() {
        let remaining = budget - requests;
        if frontier.len() > remaining {
            for (path, _) in frontier.drain(remaining..) {
                warn!(repo = %repo, path = %path, "Request budget exhausted, not listing directory");
                skipped.push(SkippedDirectory {
                    path,
                    reason: SkipReason::BudgetExhausted,
                });
            }
        }
        requests += frontier.len();

        let level = std::mem::take(&mut frontier);
        let results: Vec<(String, usize, Result<Vec<RemoteEntry>, ReadError>)> =
            stream::iter(level)
                .map(|(path, depth)| async move {
                    let listed = list_with_timeout(reader, repo, &path, config.listing_timeout).await;
                    (path, depth, listed)
                })
                .buffered(config.concurrency.max(1))
                .collect()
                .await;

        for (path, depth, listed) in results {
            let children = match listed {
                Ok(children) => children,
                // GitHub answers 404 on the contents root of an empty repository
                Err(ReadError::NotFound(_)) if path.is_empty() => {
                    warn!(repo = %repo, "Repository root has no contents, continuing with an empty tree");
                    Vec::new()
                }
                Err(e) if path.is_empty() => {
                    error!(repo = %repo, error = %e, "Failed to list repository root");
                    return Err(TourError::Access(format!(
                        "failed to list repository {repo}: {e}"
                    )));
                }
                Err(e) => {
                    warn!(repo = %repo, path = %path, error = %e, "Skipping subdirectory that could not be listed");
                    skipped.push(SkippedDirectory {
                        path,
                        reason: SkipReason::Listing(e),
                    });
                    continue;
                }
            };

            let kept: Vec<RemoteEntry> = children
                .into_iter()
                .filter(|child| keep_entry(child, depth, config))
                .collect();
            for child in &kept {
                if child.kind == EntryKind::Directory && depth < config.max_depth {
                    frontier.push((child.path.clone(), depth + 1));
                }
            }
            debug!(path = %path, depth, kept = kept.len(), "Listed directory");
            listings.insert(path, kept);
        }
    }

    let entries = assemble_pre_order(&listings, config.max_depth);
    info!(
        repo = %repo,
        entries = entries.len(),
        skipped = skipped.len(),
        requests,
        "Repository tree fetched"
    );
    Ok(FetchedTree { entries, skipped })
}

async fn list_with_timeout<R>(
    reader: &R,
    repo: &RepoId,
    path: &str,
    limit: Duration,
) -> Result<Vec<RemoteEntry>, ReadError>
where
    R: RepositoryReader + ?Sized,
{
    match tokio::time::timeout(limit, reader.list_directory(repo, path)).await {
        Ok(listed) => listed,
        Err(_) => Err(ReadError::TimedOut(limit)),
    }
}

fn keep_entry(entry: &RemoteEntry, depth: usize, config: &TraversalConfig) -> bool {
    if depth == 0
        && entry.name.starts_with('.')
        && !ROOT_HIDDEN_ALLOW_LIST.contains(&entry.name.as_str())
    {
        debug!(path = %entry.path, "Skipping hidden root entry");
        return false;
    }
    if entry.kind == EntryKind::Directory && config.skip_names.contains(&entry.name) {
        debug!(path = %entry.path, "Skipping excluded directory");
        return false;
    }
    true
}

/// Walk the collected listings depth-first. Expansion stops at `max_depth` even if
/// a listing echoes an ancestor's path back.
fn assemble_pre_order(
    listings: &HashMap<String, Vec<RemoteEntry>>,
    max_depth: usize,
) -> Vec<TreeEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<(&RemoteEntry, usize)> = listings
        .get("")
        .map(|root| root.iter().rev().map(|e| (e, 0)).collect())
        .unwrap_or_default();

    while let Some((entry, depth)) = stack.pop() {
        entries.push(TreeEntry::from(entry));
        if entry.kind != EntryKind::Directory || depth >= max_depth {
            continue;
        }
        if let Some(children) = listings.get(&entry.path) {
            stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
        }
    }
    entries
}
