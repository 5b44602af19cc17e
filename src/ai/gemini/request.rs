//! Request construction for image generation and editing.

use super::types::{Content, GenerateContentRequest, GenerationConfig, ImageConfig, InlineData, Part};
use crate::ai::mime::detect_image_mime;
use crate::{Error, Result};
use base64::Engine as _;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Output aspect ratios accepted by Gemini image models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Portrait2x3,
    Landscape3x2,
    Portrait3x4,
    Landscape4x3,
    Portrait4x5,
    Landscape5x4,
    Portrait9x16,
    Landscape16x9,
    Ultrawide21x9,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 10] = [
        AspectRatio::Square,
        AspectRatio::Portrait2x3,
        AspectRatio::Landscape3x2,
        AspectRatio::Portrait3x4,
        AspectRatio::Landscape4x3,
        AspectRatio::Portrait4x5,
        AspectRatio::Landscape5x4,
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
        AspectRatio::Ultrawide21x9,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
        }
    }

    /// Nominal output resolution (width, height) for this ratio at `size`.
    pub fn pixels(&self, size: ImageSize) -> (u32, u32) {
        let (w, h) = match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Portrait2x3 => (848, 1264),
            AspectRatio::Landscape3x2 => (1264, 848),
            AspectRatio::Portrait3x4 => (896, 1200),
            AspectRatio::Landscape4x3 => (1200, 896),
            AspectRatio::Portrait4x5 => (928, 1152),
            AspectRatio::Landscape5x4 => (1152, 928),
            AspectRatio::Portrait9x16 => (768, 1376),
            AspectRatio::Landscape16x9 => (1376, 768),
            AspectRatio::Ultrawide21x9 => (1584, 672),
        };
        let scale = size.scale();
        (w * scale, h * scale)
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                let accepted: Vec<&str> = AspectRatio::ALL.iter().map(|r| r.as_str()).collect();
                Error::InvalidRequest(format!(
                    "Unsupported aspect ratio '{}'. Expected one of: {}",
                    s,
                    accepted.join(", ")
                ))
            })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    OneK,
    TwoK,
    FourK,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }

    fn scale(&self) -> u32 {
        match self {
            ImageSize::OneK => 1,
            ImageSize::TwoK => 2,
            ImageSize::FourK => 4,
        }
    }
}

impl FromStr for ImageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(ImageSize::OneK),
            "2K" => Ok(ImageSize::TwoK),
            "4K" => Ok(ImageSize::FourK),
            other => Err(Error::InvalidRequest(format!(
                "Unsupported image size '{}'. Expected one of: 1K, 2K, 4K",
                other
            ))),
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input image to inline into the request.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read an image from disk, sniffing its mime type from the header bytes.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            tracing::error!("Failed to read source image {}: {}", path.display(), e);
            e
        })?;
        let mime_type = detect_image_mime(&bytes);
        tracing::debug!(
            "Loaded source image {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime_type
        );
        Ok(Self::new(bytes, mime_type))
    }

    fn to_part(&self) -> Part {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: self.mime_type.clone(),
                data: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
            },
        }
    }
}

/// Everything needed to build one `generateContent` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub images: Vec<SourceImage>,
    pub aspect_ratio: Option<AspectRatio>,
    pub image_size: Option<ImageSize>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: SourceImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn with_image_size(mut self, image_size: ImageSize) -> Self {
        self.image_size = Some(image_size);
        self
    }

    /// Build the wire payload. Parts are ordered `[text, image...]`.
    pub fn build(&self) -> Result<GenerateContentRequest> {
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidRequest("Prompt must not be empty".to_string()));
        }

        let mut parts = Vec::with_capacity(1 + self.images.len());
        parts.push(Part::Text {
            text: self.prompt.clone(),
        });
        parts.extend(self.images.iter().map(SourceImage::to_part));

        let generation_config = if self.aspect_ratio.is_some() || self.image_size.is_some() {
            Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: self.aspect_ratio.map(|r| r.as_str().to_string()),
                    image_size: self.image_size.map(|s| s.as_str().to_string()),
                }),
            })
        } else {
            None
        };

        Ok(GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_prompt_only_has_single_text_part() {
        let payload = ImageRequest::new("a nano banana dish").build().unwrap();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "contents": [{ "parts": [{ "text": "a nano banana dish" }] }]
            })
        );
    }

    #[test]
    fn test_prompt_with_image_orders_text_then_image() {
        let bytes = PNG_HEADER.to_vec();
        let payload = ImageRequest::new("Add a cat in this picture")
            .with_image(SourceImage::new(bytes.clone(), "image/png"))
            .build()
            .unwrap();

        let parts = &payload.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], Part::Text { text } if text == "Add a cat in this picture"));
        match &parts[1] {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/png");
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(&inline_data.data)
                    .unwrap();
                assert_eq!(decoded, bytes);
            }
            other => panic!("expected inline data, got {:?}", other),
        }
    }

    #[test]
    fn test_generation_config_serialization() {
        let payload = ImageRequest::new("wide shot")
            .with_aspect_ratio(AspectRatio::Landscape16x9)
            .with_image_size(ImageSize::TwoK)
            .build()
            .unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json["generationConfig"],
            serde_json::json!({ "imageConfig": { "aspectRatio": "16:9", "imageSize": "2K" } })
        );
    }

    #[test]
    fn test_aspect_ratio_only_omits_image_size() {
        let payload = ImageRequest::new("tall")
            .with_aspect_ratio(AspectRatio::Portrait9x16)
            .build()
            .unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json["generationConfig"],
            serde_json::json!({ "imageConfig": { "aspectRatio": "9:16" } })
        );
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let err = ImageRequest::new("   ").build().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape16x9);
        assert_eq!(" 1:1 ".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
        let err = "16:10".parse::<AspectRatio>().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(err.to_string().contains("21:9"));
    }

    #[test]
    fn test_image_size_parse() {
        assert_eq!("2k".parse::<ImageSize>().unwrap(), ImageSize::TwoK);
        assert!(matches!(
            "8K".parse::<ImageSize>().unwrap_err(),
            Error::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_nominal_pixels() {
        assert_eq!(AspectRatio::Landscape16x9.pixels(ImageSize::TwoK), (2752, 1536));
        assert_eq!(AspectRatio::Square.pixels(ImageSize::FourK), (4096, 4096));
        assert_eq!(AspectRatio::Portrait9x16.pixels(ImageSize::OneK), (768, 1376));
    }

    #[test]
    fn test_source_image_from_path_sniffs_mime() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();

        let image = SourceImage::from_path(file.path()).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
    }

    #[test]
    fn test_source_image_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceImage::from_path(&dir.path().join("111.png")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
