//! Shared wiremock helpers for Gemini client tests.

use wiremock::matchers::{method, path_regex};
use wiremock::MockBuilder;

pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/:]+:generateContent$";

pub fn post_path_regex(regex: &str) -> MockBuilder {
    wiremock::Mock::given(method("POST")).and(path_regex(regex))
}

/// A response body whose only part is `text`.
pub fn text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

/// A response body with a text part followed by one inline PNG.
pub fn image_response(image: &[u8]) -> serde_json::Value {
    use base64::Engine as _;
    serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [
                    { "text": "Here is the image." },
                    {
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": base64::engine::general_purpose::STANDARD.encode(image)
                        }
                    }
                ]
            },
            "finishReason": "STOP"
        }]
    })
}
