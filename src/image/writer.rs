use crate::ai::mime::extension_for_mime;
use crate::ai::DecodedImage;
use crate::Result;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// An image that has been written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub mime_type: String,
    pub size_bytes: usize,
    /// Pixel dimensions, when the bytes could be decoded as an image.
    pub dimensions: Option<(u32, u32)>,
}

/// Probe pixel dimensions without decoding the full image.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dims) => Some(dims),
        Err(e) => {
            tracing::warn!("Could not read image dimensions: {}", e);
            None
        }
    }
}

/// Write `image` to `path`, replacing any existing file.
pub fn write_image(image: &DecodedImage, path: &Path) -> Result<SavedImage> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    warn_on_extension_mismatch(path, &image.mime_type);

    std::fs::write(path, &image.bytes).map_err(|e| {
        tracing::error!("Failed to write image to {}: {}", path.display(), e);
        e
    })?;

    let dimensions = probe_dimensions(&image.bytes);
    tracing::debug!(
        "Wrote {} bytes ({}) to {}",
        image.bytes.len(),
        image.mime_type,
        path.display()
    );

    Ok(SavedImage {
        path: path.to_path_buf(),
        mime_type: image.mime_type.clone(),
        size_bytes: image.bytes.len(),
        dimensions,
    })
}

/// Output paths for `count` images: `base` first, then `{stem}_{n}.{ext}`.
pub fn output_paths(base: &Path, count: usize) -> Vec<PathBuf> {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    let ext = base.extension().map(|e| e.to_string_lossy().to_string());

    (0..count)
        .map(|n| {
            if n == 0 {
                return base.to_path_buf();
            }
            let name = match &ext {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            };
            base.with_file_name(name)
        })
        .collect()
}

/// Write every image, the first to `base` and the rest alongside it.
///
/// Writes stop at the first failure. Files written before it stay on disk
/// and are logged, since a rerun overwrites them anyway.
pub fn write_images(images: &[DecodedImage], base: &Path) -> Result<Vec<SavedImage>> {
    let mut saved = Vec::with_capacity(images.len());
    for (path, image) in output_paths(base, images.len()).iter().zip(images) {
        match write_image(image, path) {
            Ok(image) => saved.push(image),
            Err(e) => {
                if !saved.is_empty() {
                    let written: Vec<String> =
                        saved.iter().map(|s| s.path.display().to_string()).collect();
                    tracing::warn!(
                        "Stopped after {} of {} images; already written: {}",
                        saved.len(),
                        images.len(),
                        written.join(", ")
                    );
                }
                return Err(e);
            }
        }
    }
    Ok(saved)
}

fn warn_on_extension_mismatch(path: &Path, mime_type: &str) {
    let Some(expected) = extension_for_mime(mime_type) else {
        return;
    };
    let actual = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    let matches = match actual.as_deref() {
        Some("jpeg") => expected == "jpg",
        Some(ext) => ext == expected,
        None => false,
    };
    if !matches {
        tracing::warn!(
            "Model returned {} but output path {} has a different extension",
            mime_type,
            path.display()
        );
    }
}
