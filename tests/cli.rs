use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

/// The binary with every credential variable removed, so failures are deterministic.
/// It runs from the temp dir so a checkout's `.env` cannot bring them back.
fn repo_tour() -> Command {
    let mut cmd = Command::cargo_bin("repo-tour").expect("Binary exists");
    cmd.current_dir(std::env::temp_dir())
        .env_remove("GOOGLE_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("GITHUB_TOKEN")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn rejects_malformed_repository_before_anything_else() {
    for bad in ["just-a-name", "a/b/c", "/repo", "owner/"] {
        repo_tour()
            .arg(bad)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Validation error"))
            .stderr(predicate::str::contains("owner/repo"));
    }
}

#[test]
fn missing_gemini_key_is_a_configuration_error() {
    repo_tour()
        .arg("octo/demo")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Gemini API key required"));
}

#[test]
fn named_token_variable_must_exist() {
    repo_tour()
        .args(["octo/demo", "--github-token-env", "REPO_TOUR_TEST_UNSET_TOKEN"])
        .arg("--gemini-key")
        .arg("dummy")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Environment variable 'REPO_TOUR_TEST_UNSET_TOKEN' not found",
        ));
}

#[test]
fn invalid_config_file_is_reported() {
    let config = NamedTempFile::new().expect("temp file");
    write(config.path(), b"traversal: [:::").expect("write config");

    repo_tour()
        .arg("octo/demo")
        .arg("--config")
        .arg(config.path())
        .arg("--gemini-key")
        .arg("dummy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config YAML"));
}

#[test]
fn lenient_options_warn_instead_of_failing_parse() {
    // Bad depth and mode only warn; the run still stops at the missing key
    repo_tour()
        .args(["octo/demo", "--max-depth", "12", "--mode", "everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max-depth should be between 1 and 5"))
        .stderr(predicate::str::contains("mode must be 'summary' or 'tour'"))
        .stderr(predicate::str::contains("Gemini API key required"));
}

#[test]
fn negative_max_depth_falls_back_with_warning() {
    repo_tour()
        .args(["octo/demo", "--max-depth", "-1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("max-depth should be between 1 and 5"))
        .stderr(predicate::str::contains("Gemini API key required"));
}

#[test]
fn help_lists_options() {
    repo_tour()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--github-token-env"))
        .stdout(predicate::str::contains("--max-depth"))
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--json"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{event:?}"));
    }
}

#[tokio::test]
async fn run_emits_trace_initialised_and_rejects_bad_repo() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use repo_tour::cli::{run, Cli};
    use repo_tour_core::error::TourError;

    let cli = Cli {
        repo: "not-a-repo".to_string(),
        github_token: None,
        github_token_env: None,
        gemini_key: None,
        max_depth: None,
        mode: "tour".to_string(),
        config: None,
        json: false,
    };

    let err = run(cli).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TourError>(),
        Some(TourError::Validation(_))
    ));

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
