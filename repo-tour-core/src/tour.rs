//! High-level pipeline: README + tree → prompt → generation → structured report.
//!
//! This module wires the core components into the two request modes:
//!   - [`generate_summary`]: README only, one generation call, summary layout
//!   - [`generate_tour`]: README plus bounded tree traversal, classification and
//!     statistics, one generation call, tour layout
//!
//! # Responsibilities
//! - Runs stages in sequence; the only concurrency is inside tree traversal
//! - Bounds the repository check and README read by the traversal's listing
//!   timeout, and the generation call by [`PipelineConfig::generation_timeout`]
//! - Emits tracing events for each stage
//! - Holds no state between runs; every outcome is built fresh
//!
//! # Error Handling
//! A missing README is replaced by a placeholder note. Every other failure is
//! returned as the matching [`TourError`] kind without retries.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::classify::{classify, ImportantFiles};
use crate::config::PipelineConfig;
use crate::contract::{RepoId, RepositoryReader, TextGenerator, TreeEntry};
use crate::error::{ReadError, TourError};
use crate::extract::{extract, StructuredObject};
use crate::fetch::{fetch, SkippedDirectory};
use crate::prompt::{assemble, RepositoryContext, RequestMode};
use crate::report;
use crate::stats::{aggregate, RepoStats};

pub const README_PATH: &str = "README.md";
pub const README_MISSING_NOTE: &str = "README.md not found in repository.";

#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: StructuredObject,
    /// Canonical indented JSON of `summary`.
    pub summary_json: String,
    pub formatted_summary: String,
}

#[derive(Debug, Clone)]
pub struct TourOutcome {
    pub tour: StructuredObject,
    /// Canonical indented JSON of `tour`.
    pub tour_json: String,
    pub formatted_tour: String,
    pub entries: Vec<TreeEntry>,
    pub important_files: ImportantFiles,
    pub repo_stats: RepoStats,
    /// Subtrees missing from `entries`.
    pub skipped: Vec<SkippedDirectory>,
}

pub async fn generate_summary<R, G>(
    repo: &RepoId,
    config: &PipelineConfig,
    reader: &R,
    generator: &G,
) -> Result<SummaryOutcome, TourError>
where
    R: RepositoryReader + ?Sized,
    G: TextGenerator + ?Sized,
{
    info!(repo = %repo, "[TOUR] Starting summary pipeline");
    let limit = config.traversal.listing_timeout;
    check_repository(reader, repo, limit).await?;
    let readme = fetch_readme(reader, repo, limit).await?;

    let important_files = ImportantFiles::default();
    let stats = RepoStats::default();
    let ctx = RepositoryContext {
        repo,
        readme: &readme,
        entries: &[],
        important_files: &important_files,
        stats: &stats,
    };
    let prompt = assemble(RequestMode::Summary, &ctx);

    let summary = generate_object(generator, &prompt.text(), config.generation_timeout).await?;
    let summary_json = canonical_json(&summary);
    let formatted_summary = report::format_summary(&summary);

    info!(repo = %repo, fields = summary.len(), "[TOUR] Summary generated");
    Ok(SummaryOutcome {
        summary,
        summary_json,
        formatted_summary,
    })
}

pub async fn generate_tour<R, G>(
    repo: &RepoId,
    config: &PipelineConfig,
    reader: &R,
    generator: &G,
) -> Result<TourOutcome, TourError>
where
    R: RepositoryReader + ?Sized,
    G: TextGenerator + ?Sized,
{
    info!(repo = %repo, max_depth = config.traversal.max_depth, "[TOUR] Starting guided tour pipeline");
    let limit = config.traversal.listing_timeout;
    check_repository(reader, repo, limit).await?;
    let readme = fetch_readme(reader, repo, limit).await?;

    let tree = fetch(reader, repo, &config.traversal).await?;
    if !tree.skipped.is_empty() {
        warn!(repo = %repo, skipped = tree.skipped.len(), "[TOUR] Some directories could not be listed");
    }

    let important_files = classify(&tree.entries);
    let repo_stats = aggregate(&tree.entries);
    debug!(
        files = repo_stats.total_files,
        directories = repo_stats.total_directories,
        "[TOUR] Repository statistics computed"
    );

    let ctx = RepositoryContext {
        repo,
        readme: &readme,
        entries: &tree.entries,
        important_files: &important_files,
        stats: &repo_stats,
    };
    let prompt = assemble(RequestMode::Tour, &ctx);

    let tour = generate_object(generator, &prompt.text(), config.generation_timeout).await?;
    let tour_json = canonical_json(&tour);
    let formatted_tour = report::format_tour(&tour);

    info!(repo = %repo, entries = tree.entries.len(), "[TOUR] Guided tour generated");
    Ok(TourOutcome {
        tour,
        tour_json,
        formatted_tour,
        entries: tree.entries,
        important_files,
        repo_stats,
        skipped: tree.skipped,
    })
}

/// `call`, or [`ReadError::TimedOut`] once `limit` has passed.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ReadError>>,
) -> Result<T, ReadError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(ReadError::TimedOut(limit)))
}

async fn check_repository<R>(reader: &R, repo: &RepoId, limit: Duration) -> Result<(), TourError>
where
    R: RepositoryReader + ?Sized,
{
    bounded(limit, reader.check_repository(repo)).await.map_err(|e| {
        error!(repo = %repo, error = %e, "[TOUR][ERROR] Repository check failed");
        match e {
            ReadError::NotFound(_) => {
                TourError::NotFound(format!("repository {repo} not found or is private"))
            }
            other => TourError::Access(format!("cannot access repository {repo}: {other}")),
        }
    })
}

/// README text, or [`README_MISSING_NOTE`] when the repository has none.
async fn fetch_readme<R>(reader: &R, repo: &RepoId, limit: Duration) -> Result<String, TourError>
where
    R: RepositoryReader + ?Sized,
{
    match bounded(limit, reader.get_file_content(repo, README_PATH)).await {
        Ok(bytes) => {
            let readme = String::from_utf8_lossy(&bytes).into_owned();
            info!(repo = %repo, chars = readme.chars().count(), "[TOUR] README fetched");
            Ok(readme)
        }
        Err(ReadError::NotFound(_)) => {
            warn!(repo = %repo, "[TOUR] README.md not found, continuing with placeholder");
            Ok(README_MISSING_NOTE.to_string())
        }
        Err(e) => {
            error!(repo = %repo, error = %e, "[TOUR][ERROR] Failed to fetch README.md");
            Err(TourError::Access(format!(
                "failed to fetch {README_PATH} from {repo}: {e}"
            )))
        }
    }
}

async fn generate_object<G>(
    generator: &G,
    prompt: &str,
    limit: Duration,
) -> Result<StructuredObject, TourError>
where
    G: TextGenerator + ?Sized,
{
    debug!(prompt_chars = prompt.chars().count(), "[TOUR] Sending generation request");
    let raw = match tokio::time::timeout(limit, generator.generate(prompt)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            error!(error = %e, "[TOUR][ERROR] Generation call failed");
            return Err(TourError::Upstream(e.to_string()));
        }
        Err(_) => {
            error!(timeout_secs = limit.as_secs(), "[TOUR][ERROR] Generation call timed out");
            return Err(TourError::Upstream(format!(
                "generation timed out after {limit:?}"
            )));
        }
    };

    extract(&raw).map_err(|e| {
        error!(error = %e, response_chars = raw.chars().count(), "[TOUR][ERROR] Could not extract JSON from response");
        TourError::Parse(e)
    })
}

fn canonical_json(object: &StructuredObject) -> String {
    // A Map of Values always serializes
    serde_json::to_string_pretty(object).unwrap_or_default()
}
