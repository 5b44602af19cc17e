use super::{GeneratedContent, ImageGenerationService, ImageRequest, ResponsePart};
use crate::ai::gemini::InlineImage;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::sync::{Arc, Mutex};

/// Canned-response image generator. Clones share state, so a test can keep
/// a probe while the app owns the boxed original.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<Vec<ResponsePart>>>>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail_with: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue a response made of a single image part.
    pub fn with_image_response(self, image: Vec<u8>) -> Self {
        self.with_parts(vec![ResponsePart::Image(InlineImage {
            mime_type: "image/png".to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(image),
        })])
    }

    /// Queue a response made of a single text part.
    pub fn with_text_response(self, text: String) -> Self {
        self.with_parts(vec![ResponsePart::Text(text)])
    }

    pub fn with_parts(self, parts: Vec<ResponsePart>) -> Self {
        self.responses.lock().unwrap().push(parts);
        self
    }

    /// Make every call fail with an API error carrying `message`.
    pub fn with_failure(self, message: String) -> Self {
        *self.fail_with.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedContent> {
        request.build()?;

        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let count = requests.len();

        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(Error::Api {
                status: 500,
                body: message,
            });
        }

        let responses = self.responses.lock().unwrap();
        let parts = if responses.is_empty() {
            // Tiny PNG signature as a default image
            vec![ResponsePart::Image(InlineImage {
                mime_type: "image/png".to_string(),
                data: base64::engine::general_purpose::STANDARD
                    .encode([0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            })]
        } else {
            responses[(count - 1) % responses.len()].clone()
        };

        Ok(GeneratedContent {
            parts,
            finish_reason: Some("STOP".to_string()),
        })
    }
}
