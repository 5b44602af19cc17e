pub mod client;
pub mod image;
pub mod request;
pub mod response;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::GeminiHttpClient;
pub use image::GeminiImageClient;
pub use request::{AspectRatio, ImageRequest, ImageSize, SourceImage};
pub use response::{DecodedImage, GeneratedContent, InlineImage, ResponsePart};
