//! Classification and decoding of `generateContent` responses.

use super::types::{GenerateContentResponse, RawPart};
use crate::{Error, Result};
use base64::Engine as _;

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Base64 image payload as returned by the model, not yet decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn decode(&self) -> Result<DecodedImage> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| {
                tracing::error!("Failed to decode Gemini base64 image: {}", e);
                e
            })?;
        Ok(DecodedImage {
            mime_type: self.mime_type.clone(),
            bytes,
        })
    }
}

/// Raw image bytes ready to be written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A response part, classified by which fields it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePart {
    Text(String),
    Image(InlineImage),
    /// Parts this client has no use for (function calls, empty parts, ...).
    Other,
}

impl From<RawPart> for ResponsePart {
    fn from(part: RawPart) -> Self {
        if let Some(inline) = part.inline_data.filter(|d| !d.data.is_empty()) {
            return ResponsePart::Image(InlineImage {
                mime_type: inline
                    .mime_type
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string()),
                data: inline.data,
            });
        }
        match part.text {
            Some(text) if part.thought != Some(true) => ResponsePart::Text(text),
            _ => ResponsePart::Other,
        }
    }
}

/// The parts of the first candidate of a response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratedContent {
    pub parts: Vec<ResponsePart>,
    pub finish_reason: Option<String>,
}

impl GeneratedContent {
    pub fn from_response(response: GenerateContentResponse) -> Result<Self> {
        let block_reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            Error::ResponseShape(match block_reason {
                Some(reason) => format!("no candidates returned (prompt blocked: {})", reason),
                None => "no candidates returned".to_string(),
            })
        })?;

        let content = candidate.content.ok_or_else(|| {
            Error::ResponseShape(format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        Ok(Self {
            parts: content.parts.into_iter().map(ResponsePart::from).collect(),
            finish_reason: candidate.finish_reason,
        })
    }

    pub fn texts(&self) -> Vec<String> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ResponsePart::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// All text parts joined with newlines, if any.
    pub fn text(&self) -> Option<String> {
        let texts = self.texts();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }

    pub fn inline_images(&self) -> impl Iterator<Item = &InlineImage> {
        self.parts.iter().filter_map(|p| match p {
            ResponsePart::Image(image) => Some(image),
            _ => None,
        })
    }

    /// Decode every image part, in response order.
    pub fn images(&self) -> Result<Vec<DecodedImage>> {
        self.inline_images().map(InlineImage::decode).collect()
    }

    /// The first image part, decoded. Errors if the model returned none.
    pub fn expect_image(&self) -> Result<DecodedImage> {
        self.inline_images()
            .next()
            .ok_or_else(|| Error::NoImage {
                texts: self.texts(),
            })?
            .decode()
    }

    pub fn expect_text(&self) -> Result<String> {
        self.text().ok_or_else(|| {
            Error::ResponseShape("expected a text part but the response had none".to_string())
        })
    }
}
