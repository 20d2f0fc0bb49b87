//! Google Gemini adapter implementing the core `TextGenerator` contract.

use async_trait::async_trait;
use repo_tour_core::contract::{GenerateError, TextGenerator};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::config::GeminiSettings;

pub struct GeminiClient {
    client: Client,
    model: String,
    /// `{base}/models/{model}:generateContent?key=...`
    generate_url: Url,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, GenerateError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let generate_url = generate_url(&settings.api_base, &settings.model, &settings.api_key)?;
        tracing::info!(model = %settings.model, api_base = %settings.api_base, "Initialized GeminiClient");
        Ok(GeminiClient {
            client,
            model: settings.model.clone(),
            generate_url,
        })
    }
}

fn generate_url(api_base: &str, model: &str, api_key: &str) -> Result<Url, GenerateError> {
    let endpoint = format!(
        "{}/models/{model}:generateContent",
        api_base.trim_end_matches('/')
    );
    let mut url = Url::parse(&endpoint)
        .map_err(|e| format!("invalid Gemini API base URL '{api_base}': {e}"))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::info!(model = %self.model, prompt_chars = prompt.chars().count(), "Requesting generation");
        let response = self
            .client
            .post(self.generate_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, which holds the key
                let e = e.without_url();
                tracing::error!(error = %e, "Gemini request failed");
                format!("Gemini request failed: {e}")
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or(body);
            tracing::error!(%status, error = %message, "Gemini API returned an error status");
            return Err(format!("Gemini API error (HTTP {status}): {message}").into());
        }

        let text = response_text(&body)?;
        tracing::debug!(response_chars = text.chars().count(), "Generation complete");
        Ok(text)
    }
}

/// Concatenated text parts of the first candidate.
pub fn response_text(body: &str) -> Result<String, GenerateError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| format!("invalid Gemini response: {e}"))?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or("no candidates in Gemini response")?;
    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(format!("empty response from model (finish reason: {reason})").into());
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}, "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10}
        }"#;
        assert_eq!(response_text(body).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn missing_or_empty_candidates_are_errors() {
        assert!(response_text(r#"{"candidates": []}"#).is_err());
        let err = response_text(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
        assert!(response_text("not json").is_err());
    }

    fn client(api_key: &str) -> GeminiClient {
        GeminiClient::new(&GeminiSettings {
            api_base: "https://example.test/v1beta/".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(5),
        })
        .expect("client should build")
    }

    #[test]
    fn url_targets_model_endpoint() {
        assert_eq!(
            client("k").generate_url.as_str(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent?key=k"
        );
    }

    #[test]
    fn api_key_is_query_encoded() {
        let url = client("a&b=c d").generate_url;
        assert_eq!(
            url.as_str(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent?key=a%26b%3Dc+d"
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("key".to_string(), "a&b=c d".to_string())]);
    }

    #[test]
    fn unusable_api_base_is_rejected() {
        assert!(generate_url("not a url", "m", "k").is_err());
    }
}
