// repo-tour/src/config.rs

use std::fmt;
use std::time::Duration;

use repo_tour_core::config::PipelineConfig;
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Optional YAML tuning file. Every section and field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub github: GitHubSection,
    pub gemini: GeminiSection,
    pub traversal: TraversalSection,
    pub generation: GenerationSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSection {
    pub api_base: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiSection {
    pub api_base: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraversalSection {
    pub max_depth: Option<usize>,
    pub skip_names: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub max_requests: Option<usize>,
    pub listing_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSection {
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run: file values, CLI overrides and secrets merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pipeline: PipelineConfig,
    pub github: GitHubSettings,
    pub gemini: GeminiSettings,
}

#[derive(Clone)]
pub struct GitHubSettings {
    pub api_base: String,
    pub token: Option<String>,
    /// Per-request bound, mirrors the traversal listing timeout.
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct GeminiSettings {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    pub fn trace_loaded(&self) {
        info!(
            github_api = %self.github.api_base,
            github_token_set = self.github.token.is_some(),
            gemini_model = %self.gemini.model,
            "Loaded settings"
        );
        self.pipeline.trace_loaded();
        debug!(?self, "Settings loaded (full debug)");
    }
}
