//! Client for Gemini-compatible image generation and editing endpoints
//!
//! Builds `generateContent` requests from a prompt and optional input
//! images, sends them to a configurable base URL, and writes the returned
//! inline image data to disk.

pub mod ai;
pub mod app;
pub mod error;
pub mod history;
pub mod image;
pub mod models;
pub mod prompts;
pub mod workflows;

pub use error::{Error, Result};
