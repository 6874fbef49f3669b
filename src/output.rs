//! Writes the uploaded item and rendered outfits to disk for viewing.

use std::path::{Path, PathBuf};

use crate::error::StylistError;
use crate::intake::ClothingImage;
use crate::params::extension_for_mime;
use crate::ports::EncodedImage;
use crate::session::Outfit;

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true; // Prevents leading hyphen

    for ch in input.chars().take(max_len * 2) {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "outfit".to_string()
    } else {
        result
    }
}

/// File stem of the uploaded item copy; never used for an outfit.
pub const UPLOAD_STEM: &str = "item";

/// File stem an outfit id is written under.
#[must_use]
pub fn outfit_stem(id: &str) -> String {
    sanitize_for_filename(id, 50)
}

/// Path an outfit's image is written to.
#[must_use]
pub fn outfit_path(dir: &Path, outfit: &Outfit) -> PathBuf {
    let stem = outfit_stem(&outfit.id);
    dir.join(format!("{stem}.{}", extension_for_mime(&outfit.image.mime_type)))
}

/// Path the uploaded item copy is written to.
#[must_use]
pub fn upload_path(dir: &Path, upload: &ClothingImage) -> PathBuf {
    dir.join(format!("{UPLOAD_STEM}.{}", extension_for_mime(&upload.image.mime_type)))
}

/// Write the uploaded item so it can be viewed next to the outfits.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_upload(dir: &Path, upload: &ClothingImage) -> Result<PathBuf, StylistError> {
    let path = upload_path(dir, upload);
    write_image(&upload.image, &path)?;
    Ok(path)
}

/// Write an outfit's current image, replacing any earlier rendering.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_outfit(dir: &Path, outfit: &Outfit) -> Result<PathBuf, StylistError> {
    let path = outfit_path(dir, outfit);
    write_image(&outfit.image, &path)?;
    Ok(path)
}

fn write_image(image: &EncodedImage, path: &Path) -> Result<(), StylistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &image.data)?;
    Ok(())
}
