//! Parameter validation and media-type helpers.

/// Aspect ratios accepted by Gemini image models.
const GEMINI_ASPECT_RATIOS: [&str; 10] =
    ["1:1", "2:3", "3:2", "3:4", "4:3", "4:5", "5:4", "9:16", "16:9", "21:9"];

/// Validate that an aspect ratio is supported by Gemini image models.
///
/// # Errors
///
/// Returns an error if the ratio is not recognized.
pub fn validate_aspect_ratio(ratio: &str) -> Result<(), String> {
    if GEMINI_ASPECT_RATIOS.contains(&ratio) {
        Ok(())
    } else {
        Err(format!("Unsupported aspect ratio '{ratio}'. Valid: {GEMINI_ASPECT_RATIOS:?}"))
    }
}

/// Validate the reveal policy name.
///
/// # Errors
///
/// Returns an error if the value is neither `all` nor `incremental`.
pub fn validate_reveal(reveal: &str) -> Result<(), String> {
    match reveal {
        "all" | "incremental" => Ok(()),
        _ => Err(format!("Unsupported reveal policy '{reveal}'. Valid: all, incremental")),
    }
}

/// Get the file extension for an image media type.
#[must_use]
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "image/jpeg" | "image/jpg" => "jpg",
        _ => "bin",
    }
}

/// Guess a media type from a file extension.
#[must_use]
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}
