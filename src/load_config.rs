/// `load_config` module: reads the optional YAML tuning file and merges it with CLI
/// overrides and environment secrets into [`Settings`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into [`FileConfig`]
/// - Resolve credentials: explicit flags first, then the environment
/// - Apply defaults for everything left unset
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{anyhow, Result};
use repo_tour_core::config::{PipelineConfig, TraversalConfig, DEFAULT_MAX_DEPTH};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{
    FileConfig, GeminiSettings, GitHubSettings, Settings, DEFAULT_GEMINI_API,
    DEFAULT_GEMINI_MODEL, DEFAULT_GITHUB_API,
};

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Checked in order.
pub const GEMINI_KEY_ENVS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Inclusive bounds accepted for the traversal depth.
pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 5;

/// Values given on the command line; each one wins over file and environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub github_token: Option<String>,
    /// Name of an environment variable holding the GitHub token.
    pub github_token_env: Option<String>,
    pub gemini_key: Option<String>,
    pub max_depth: Option<usize>,
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    let config: FileConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow!("Failed to parse config YAML: {e}")
    })?;
    info!(config_path = ?path_ref, "Parsed config YAML successfully");
    Ok(config)
}

/// Merges file values, overrides and environment secrets.
pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Settings> {
    let github_token = resolve_github_token(overrides)?;
    let gemini_key = resolve_gemini_key(overrides)?;

    let mut traversal = TraversalConfig::default();
    let file_depth = file.traversal.max_depth.map(|depth| {
        bounded_depth(depth).unwrap_or_else(|| {
            warn!(
                max_depth = depth,
                "Config max_depth should be between {MIN_DEPTH} and {MAX_DEPTH}. Using default: {DEFAULT_MAX_DEPTH}"
            );
            DEFAULT_MAX_DEPTH
        })
    });
    if let Some(depth) = overrides.max_depth.or(file_depth) {
        traversal.max_depth = depth;
    }
    if let Some(names) = file.traversal.skip_names {
        traversal.skip_names = names.into_iter().collect();
    }
    if let Some(concurrency) = file.traversal.concurrency {
        traversal.concurrency = concurrency.max(1);
    }
    if let Some(max_requests) = file.traversal.max_requests {
        traversal.max_requests = max_requests.max(1);
    }
    if let Some(secs) = file.traversal.listing_timeout_secs {
        traversal.listing_timeout = Duration::from_secs(secs.max(1));
    }

    let mut pipeline = PipelineConfig {
        traversal,
        ..PipelineConfig::default()
    };
    if let Some(secs) = file.generation.timeout_secs {
        pipeline.generation_timeout = Duration::from_secs(secs.max(1));
    }

    let settings = Settings {
        github: GitHubSettings {
            api_base: file
                .github
                .api_base
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
            token: github_token,
            timeout: pipeline.traversal.listing_timeout,
        },
        gemini: GeminiSettings {
            api_base: file
                .gemini
                .api_base
                .unwrap_or_else(|| DEFAULT_GEMINI_API.to_string()),
            model: file
                .gemini
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_key: gemini_key,
            timeout: pipeline.generation_timeout,
        },
        pipeline,
    };
    settings.trace_loaded();
    Ok(settings)
}

/// `Some(depth)` when it lies within [`MIN_DEPTH`]..=[`MAX_DEPTH`].
pub fn bounded_depth(depth: usize) -> Option<usize> {
    (MIN_DEPTH..=MAX_DEPTH).contains(&depth).then_some(depth)
}

fn resolve_github_token(overrides: &Overrides) -> Result<Option<String>> {
    if let Some(token) = overrides.github_token.as_ref().filter(|t| !t.is_empty()) {
        return Ok(Some(token.clone()));
    }
    if let Some(var) = &overrides.github_token_env {
        return match non_empty_env(var) {
            Some(token) => Ok(Some(token)),
            None => {
                error!(env_var = %var, "GitHub token environment variable not set");
                Err(anyhow!("Environment variable '{var}' not found"))
            }
        };
    }
    Ok(non_empty_env(GITHUB_TOKEN_ENV))
}

fn resolve_gemini_key(overrides: &Overrides) -> Result<String> {
    if let Some(key) = overrides.gemini_key.as_ref().filter(|k| !k.is_empty()) {
        return Ok(key.clone());
    }
    GEMINI_KEY_ENVS
        .iter()
        .find_map(|var| non_empty_env(var))
        .ok_or_else(|| {
            error!("No Gemini API key provided");
            anyhow!(
                "Gemini API key required: pass --gemini-key or set {}",
                GEMINI_KEY_ENVS.join(" or ")
            )
        })
}

fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}
