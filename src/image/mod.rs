//! Image output
//!
//! Writes decoded image bytes to disk exactly as the model returned them.

pub mod writer;

pub use writer::{output_paths, write_image, write_images, SavedImage};
