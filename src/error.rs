//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),

    #[error("No image data in response{}", format_texts(.texts))]
    NoImage { texts: Vec<String> },

    #[error("Failed to decode base64 image: {0}")]
    Decode(#[from] base64::DecodeError),
}

fn format_texts(texts: &[String]) -> String {
    if texts.is_empty() {
        String::new()
    } else {
        format!(" (model replied: {})", texts.join(" "))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
