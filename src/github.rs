#![doc = "GitHub REST adapter: implements the core `RepositoryReader` contract over the contents API."]
//
//! # GitHub Integration (CLI <-> Core)
//!
//! [`GitHubClient`] is the networked [`RepositoryReader`] used by the CLI. It speaks
//! GitHub REST v3:
//!
//! - `GET /repos/{owner}/{repo}` to confirm the repository is readable
//! - `GET /repos/{owner}/{repo}/contents/{path}` for listings (JSON) and file bodies
//!   (`application/vnd.github.raw`)
//!
//! HTTP status codes are mapped to [`ReadError`] kinds: 404 is `NotFound`; 401, 403
//! and 429 are `AccessDenied` (bad credentials, private repositories and rate limits
//! all surface there); anything else is `Transport`.

use async_trait::async_trait;
use repo_tour_core::contract::{EntryKind, RemoteEntry, RepoId, RepositoryReader};
use repo_tour_core::error::ReadError;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

use crate::config::GitHubSettings;

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const API_VERSION: &str = "2022-11-28";

pub struct GitHubClient {
    client: Client,
    api_base: Url,
    token: Option<String>,
    timeout: std::time::Duration,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let api_base = Url::parse(&settings.api_base).map_err(|e| {
            tracing::error!(error = %e, api_base = %settings.api_base, "Invalid GitHub API base URL");
            format!("invalid GitHub API base URL '{}': {e}", settings.api_base)
        })?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("repo-tour/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::info!(
            api_base = %api_base,
            token_set = settings.token.is_some(),
            "Initialized GitHubClient"
        );
        Ok(GitHubClient {
            client,
            api_base,
            token: settings.token.clone(),
            timeout: settings.timeout,
        })
    }

    /// `{base}/repos/{owner}/{repo}` followed by `segments`, each percent-encoded.
    fn repo_url<'a>(&self, repo: &RepoId, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ReadError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| ReadError::Transport(format!("API base {} cannot hold a path", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
            .extend(segments.into_iter().filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn contents_url(&self, repo: &RepoId, path: &str) -> Result<Url, ReadError> {
        self.repo_url(repo, std::iter::once("contents").chain(path.split('/')))
    }

    fn get(&self, url: Url, accept: &'static str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<reqwest::Response, ReadError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, target_path = what, "GitHub request failed");
            if e.is_timeout() {
                ReadError::TimedOut(self.timeout)
            } else {
                ReadError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, what, &body);
        tracing::warn!(%status, target_path = what, error = %err, "GitHub returned an error status");
        Err(err)
    }
}

#[async_trait]
impl RepositoryReader for GitHubClient {
    async fn check_repository(&self, repo: &RepoId) -> Result<(), ReadError> {
        let url = self.repo_url(repo, std::iter::empty())?;
        self.send(self.get(url, JSON_MEDIA_TYPE), &repo.to_string())
            .await?;
        tracing::info!(repo = %repo, "Repository is accessible");
        Ok(())
    }

    async fn get_file_content(&self, repo: &RepoId, path: &str) -> Result<Vec<u8>, ReadError> {
        let url = self.contents_url(repo, path)?;
        let response = self.send(self.get(url, RAW_MEDIA_TYPE), path).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReadError::Transport(e.to_string()))?;
        tracing::debug!(repo = %repo, path, bytes = bytes.len(), "Fetched file content");
        Ok(bytes.to_vec())
    }

    async fn list_directory(&self, repo: &RepoId, path: &str) -> Result<Vec<RemoteEntry>, ReadError> {
        let url = self.contents_url(repo, path)?;
        let response = self.send(self.get(url, JSON_MEDIA_TYPE), path).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ReadError::Transport(e.to_string()))?;
        let entries = parse_listing(&body)?;
        tracing::debug!(repo = %repo, path, entries = entries.len(), "Listed directory");
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
}

/// Directories come back as an array; a file path comes back as a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentItem>),
    Single(ContentItem),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Contents-API JSON to listing entries. Every non-`dir` type is a file.
pub fn parse_listing(body: &str) -> Result<Vec<RemoteEntry>, ReadError> {
    let response: ContentsResponse = serde_json::from_str(body)
        .map_err(|e| ReadError::Transport(format!("unexpected contents response: {e}")))?;
    let items = match response {
        ContentsResponse::Listing(items) => items,
        ContentsResponse::Single(item) => vec![item],
    };
    Ok(items
        .into_iter()
        .map(|item| RemoteEntry {
            kind: if item.kind == "dir" {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            name: item.name,
            path: item.path,
            size: item.size,
        })
        .collect())
}

pub fn status_error(status: StatusCode, what: &str, body: &str) -> ReadError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        StatusCode::NOT_FOUND => ReadError::NotFound(what.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            ReadError::AccessDenied(format!("{what}: HTTP {status}: {message}"))
        }
        _ => ReadError::Transport(format!("{what}: HTTP {status}: {message}")),
    }
}
