//! AI service integration for image generation
//!
//! Provides the Gemini `generateContent` client used to generate and edit
//! images, plus a mock for exercising callers without a network.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{
    AspectRatio, DecodedImage, GeminiImageClient, GeneratedContent, ImageRequest, ImageSize,
    ResponsePart, SourceImage,
};
pub use mock::MockImageGenerationClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Perform one request/response exchange for `request`.
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedContent>;
}
