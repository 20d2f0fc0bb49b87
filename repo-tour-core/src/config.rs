use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info};

/// Directory basenames that are never listed, at any depth.
pub const DEFAULT_SKIP_NAMES: &[&str] = &[
    ".git",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "dist",
    "build",
    ".next",
    "target",
    ".idea",
    ".vscode",
    "coverage",
];

/// Hidden root-level entries that are still recorded.
pub const ROOT_HIDDEN_ALLOW_LIST: &[&str] = &[".github", ".gitignore", ".env.example"];

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_MAX_REQUESTS: usize = 500;
pub const DEFAULT_LISTING_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Traversal bounds. Built once and passed by reference; never mutated by the fetcher.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Deepest directory level that is still listed (root is 0).
    pub max_depth: usize,
    pub skip_names: BTreeSet<String>,
    /// Concurrent sibling listings per level.
    pub concurrency: usize,
    /// Upper bound on listing requests for the whole traversal.
    pub max_requests: usize,
    pub listing_timeout: Duration,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            skip_names: DEFAULT_SKIP_NAMES.iter().map(|s| s.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            max_requests: DEFAULT_MAX_REQUESTS,
            listing_timeout: DEFAULT_LISTING_TIMEOUT,
        }
    }
}

impl TraversalConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_skip_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_names = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Everything the pipeline needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub traversal: TraversalConfig,
    pub generation_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            traversal: TraversalConfig::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            max_depth = self.traversal.max_depth,
            skip_names = self.traversal.skip_names.len(),
            concurrency = self.traversal.concurrency,
            max_requests = self.traversal.max_requests,
            generation_timeout_secs = self.generation_timeout.as_secs(),
            "Loaded pipeline config"
        );
        debug!(?self, "Pipeline config loaded (full debug)");
    }
}
