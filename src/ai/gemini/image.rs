use super::client::GeminiHttpClient;
use super::request::ImageRequest;
use super::response::GeneratedContent;
use crate::ai::ImageGenerationService;
use crate::models::Config;
use crate::Result;
use async_trait::async_trait;

pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(config: &Config) -> Self {
        Self::new_with_client(config, reqwest::Client::new())
    }

    pub fn new_with_client(config: &Config, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(config, client),
        }
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedContent> {
        let payload = request.build()?;

        tracing::debug!(
            "Requesting image from {} ({} input images)",
            self.http.model(),
            request.images.len()
        );

        let response = self.http.generate_content(&payload).await?;
        let content = GeneratedContent::from_response(response)?;

        tracing::debug!(
            "Gemini returned {} parts (finish reason: {})",
            content.parts.len(),
            content.finish_reason.as_deref().unwrap_or("none")
        );

        Ok(content)
    }
}
