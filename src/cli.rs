///
/// This module implements the CLI interface for repo-tour: argument parsing, lenient
/// option fallbacks, client construction and printing of results.
///
/// All pipeline logic (traversal, classification, prompts, extraction, formatting)
/// lives in the [`repo-tour-core`] crate. This module is CLI glue only.
///
/// ## How To Use
/// - For command-line users: run the `repo-tour` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`repo-tour-core`]: ../../repo-tour-core/
use crate::config::FileConfig;
use crate::gemini::GeminiClient;
use crate::github::GitHubClient;
use crate::load_config::{bounded_depth, load_config, resolve, Overrides};
use anyhow::{anyhow, Result};
use clap::Parser;
use repo_tour_core::config::DEFAULT_MAX_DEPTH;
use repo_tour_core::contract::RepoId;
use repo_tour_core::error::TourError;
use repo_tour_core::prompt::RequestMode;
use repo_tour_core::report::format_statistics;
use repo_tour_core::tour::{generate_summary, generate_tour};
use std::path::PathBuf;

/// CLI for repo-tour: summarise a GitHub repository or build a guided developer tour.
#[derive(Parser, Debug)]
#[clap(
    name = "repo-tour",
    version,
    about = "Generate a README summary or a guided developer tour for a GitHub repository"
)]
pub struct Cli {
    /// Repository in the form owner/repo
    pub repo: String,

    /// GitHub personal access token (for private repositories and higher rate limits)
    #[clap(long)]
    pub github_token: Option<String>,

    /// Environment variable containing the GitHub token
    #[clap(long, value_name = "VAR")]
    pub github_token_env: Option<String>,

    /// Google Gemini API key (or set GOOGLE_API_KEY)
    #[clap(long)]
    pub gemini_key: Option<String>,

    /// Maximum directory depth to traverse (1-5, default: 3)
    #[clap(long, value_name = "N", allow_hyphen_values = true)]
    pub max_depth: Option<String>,

    /// 'summary' (README only) or 'tour' (full analysis)
    #[clap(long, default_value = "tour")]
    pub mode: String,

    /// Optional YAML file with API endpoints and traversal tuning
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Also print the canonical JSON result
    #[clap(long)]
    pub json: bool,
}

/// `--max-depth` value, or the default with a warning when it is unusable.
pub fn parse_max_depth(raw: Option<&str>) -> Option<usize> {
    let raw = raw?;
    match raw.trim().parse::<i64>() {
        Ok(depth) => {
            let bounded = usize::try_from(depth).ok().and_then(bounded_depth);
            Some(bounded.unwrap_or_else(|| {
                tracing::warn!(max_depth = depth, "max-depth should be between 1 and 5. Using default: {DEFAULT_MAX_DEPTH}");
                DEFAULT_MAX_DEPTH
            }))
        }
        Err(_) => {
            tracing::warn!(max_depth = raw, "Invalid max-depth value. Using default: {DEFAULT_MAX_DEPTH}");
            Some(DEFAULT_MAX_DEPTH)
        }
    }
}

/// `--mode` value, falling back to [`RequestMode::Tour`] with a warning.
pub fn parse_mode(raw: &str) -> RequestMode {
    raw.parse().unwrap_or_else(|e: String| {
        tracing::warn!(error = %e, "mode must be 'summary' or 'tour'. Using default: 'tour'");
        RequestMode::Tour
    })
}

/// One line per error kind, as shown to the user.
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TourError>() {
        Some(TourError::Validation(_)) => format!("❌ Validation error: {err}"),
        Some(TourError::NotFound(_)) => format!("❌ Repository error: {err}"),
        Some(TourError::Access(_)) => format!("❌ Access error: {err}"),
        Some(TourError::Parse(_)) => format!("❌ Response error: {err}"),
        Some(TourError::Upstream(_)) => format!("❌ Generation error: {err}"),
        None => format!("❌ Error: {err:#}"),
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    // Rejected before any configuration or network work
    let repo = RepoId::parse(cli.repo.trim())?;
    let mode = parse_mode(&cli.mode);
    let overrides = Overrides {
        github_token: cli.github_token,
        github_token_env: cli.github_token_env,
        gemini_key: cli.gemini_key,
        max_depth: parse_max_depth(cli.max_depth.as_deref()),
    };

    let file_config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let settings = resolve(file_config, &overrides)?;

    let reader = GitHubClient::new(&settings.github).map_err(|e| anyhow!(e))?;
    let generator = GeminiClient::new(&settings.gemini).map_err(|e| anyhow!(e))?;
    tracing::info!(repo = %repo, %mode, "Starting repo-tour");

    match mode {
        RequestMode::Summary => {
            println!("📚 Generating summary for: {repo}");
            let outcome =
                generate_summary(&repo, &settings.pipeline, &reader, &generator).await?;
            println!("\n✅ Summary generated!\n");
            println!("{}", outcome.formatted_summary);
            if cli.json {
                println!("\n{}", outcome.summary_json);
            }
        }
        RequestMode::Tour => {
            println!("🔍 Analyzing repository: {repo}");
            println!(
                "📊 Fetching repository structure (max depth: {})...",
                settings.pipeline.traversal.max_depth
            );
            let outcome = generate_tour(&repo, &settings.pipeline, &reader, &generator).await?;
            println!("\n✅ Analysis complete!\n");
            println!("{}", outcome.formatted_tour);
            println!("\n{}", format_statistics(&outcome.repo_stats));
            if !outcome.skipped.is_empty() {
                eprintln!(
                    "\n⚠️  {} director{} could not be listed and are missing from the analysis:",
                    outcome.skipped.len(),
                    if outcome.skipped.len() == 1 { "y" } else { "ies" }
                );
                for skipped in &outcome.skipped {
                    eprintln!("   • {}/ ({})", skipped.path, skipped.reason);
                }
            }
            if cli.json {
                println!("\n{}", outcome.tour_json);
            }
        }
    }

    tracing::info!(repo = %repo, "repo-tour completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_tour_core::error::ExtractError;

    #[test]
    fn max_depth_falls_back_to_default() {
        assert_eq!(parse_max_depth(None), None);
        assert_eq!(parse_max_depth(Some("2")), Some(2));
        assert_eq!(parse_max_depth(Some("5")), Some(5));
        assert_eq!(parse_max_depth(Some("0")), Some(DEFAULT_MAX_DEPTH));
        assert_eq!(parse_max_depth(Some("9")), Some(DEFAULT_MAX_DEPTH));
        assert_eq!(parse_max_depth(Some("deep")), Some(DEFAULT_MAX_DEPTH));
        assert_eq!(parse_max_depth(Some("-1")), Some(DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn negative_max_depth_reaches_the_fallback() {
        let cli = Cli::try_parse_from(["repo-tour", "o/r", "--max-depth", "-1"])
            .expect("negative depth should parse as a value");
        assert_eq!(cli.max_depth.as_deref(), Some("-1"));
        assert_eq!(parse_max_depth(cli.max_depth.as_deref()), Some(DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn unknown_mode_means_tour() {
        assert_eq!(parse_mode("summary"), RequestMode::Summary);
        assert_eq!(parse_mode("tour"), RequestMode::Tour);
        assert_eq!(parse_mode("everything"), RequestMode::Tour);
    }

    #[test]
    fn each_error_kind_has_its_own_message() {
        let messages: Vec<String> = [
            TourError::Validation("x".into()),
            TourError::NotFound("repository o/r not found or is private".into()),
            TourError::Access("denied".into()),
            TourError::Parse(ExtractError::NoObjectDelimiters { direct: "eof".into() }),
            TourError::Upstream("quota".into()),
        ]
        .into_iter()
        .map(|e| user_message(&anyhow::Error::new(e)))
        .collect();

        assert!(messages[0].starts_with("❌ Validation error: invalid repository identifier 'x'"));
        assert!(messages[1].starts_with("❌ Repository error: repository o/r not found"));
        assert!(messages[2].starts_with("❌ Access error"));
        assert!(messages[3].starts_with("❌ Response error: could not extract JSON"));
        assert!(messages[4].starts_with("❌ Generation error: generation failed: quota"));

        let other = user_message(&anyhow!("Environment variable 'X' not found"));
        assert_eq!(other, "❌ Error: Environment variable 'X' not found");
    }
}
