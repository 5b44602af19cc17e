use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::models::{AuthHeaderMode, Config};
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

const RAW_BODY_LOG_LIMIT: usize = 2000;

/// Lightweight Gemini REST client for the `generateContent` endpoint.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    api_path: Option<String>,
    auth_header: AuthHeaderMode,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client from configuration.
    ///
    /// The configured model should be the bare model ID (for example
    /// `gemini-2.5-flash-image`); a `models/` prefix is stripped.
    pub fn new(config: &Config) -> Self {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: &Config, client: Client) -> Self {
        let model = config
            .model
            .strip_prefix("models/")
            .unwrap_or(&config.model)
            .to_string();

        Self {
            client,
            api_key: config.api_key.clone(),
            model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_path: config.api_path.clone(),
            auth_header: config.auth_header,
            timeout: config.timeout,
        }
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full endpoint URL for `generateContent`.
    pub fn endpoint(&self) -> String {
        match &self.api_path {
            Some(path) if path.starts_with('/') => format!("{}{}", self.base_url, path),
            Some(path) => format!("{}/{}", self.base_url, path),
            None => format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ),
        }
    }

    /// Calls Gemini's `generateContent` endpoint once.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint();
        tracing::debug!("POST {} ({} content parts)", url, part_count(request));

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header(self.auth_header.header_name(), &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response.text().await?;
        tracing::debug!("Gemini raw response: {}", truncate(&body, RAW_BODY_LOG_LIMIT));
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                "Failed to parse Gemini response: {}\nBody: {}",
                e,
                truncate(&body, RAW_BODY_LOG_LIMIT)
            );
            Error::ResponseShape(format!("Failed to parse Gemini response: {}", e))
        })
    }
}

fn part_count(request: &GenerateContentRequest) -> usize {
    request.contents.iter().map(|c| c.parts.len()).sum()
}

/// Cut `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
