//! Upload intake: turns a user-selected file into a transferable image.

use std::path::Path;

use crate::error::StylistError;
use crate::params::mime_for_extension;
use crate::ports::EncodedImage;

/// Media type used when neither the content nor the extension identify the file.
const FALLBACK_MIME: &str = "application/octet-stream";

/// The user's uploaded clothing photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClothingImage {
    /// File name the photo was read from.
    pub file_name: String,
    /// Bytes and media type, as sent to the idea generator.
    pub image: EncodedImage,
}

/// Read an uploaded photo from disk.
///
/// Nothing is rejected on media type; the type is sniffed from the content,
/// then the extension, then left as `application/octet-stream`.
///
/// # Errors
///
/// Returns [`StylistError::Encoding`] if the file cannot be read or is empty.
pub fn load(path: &Path) -> Result<ClothingImage, StylistError> {
    let data = std::fs::read(path)
        .map_err(|e| StylistError::Encoding(format!("{}: {e}", path.display())))?;
    if data.is_empty() {
        return Err(StylistError::Encoding(format!("{}: file is empty", path.display())));
    }

    let mime_type = detect_mime(&data, path);
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    Ok(ClothingImage { file_name, image: EncodedImage { data, mime_type } })
}

/// Detect the media type of an uploaded file.
fn detect_mime(data: &[u8], path: &Path) -> String {
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type().to_string();
    }
    path.extension()
        .and_then(|ext| mime_for_extension(&ext.to_string_lossy()))
        .unwrap_or(FALLBACK_MIME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(1, 1);
        let mut buf = std::io::Cursor::new(Vec::<u8>::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn sniffs_content_over_extension() {
        let dir = std::env::temp_dir().join("stylist_intake_sniff");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("shirt.jpg");
        std::fs::write(&path, png_bytes()).unwrap();

        let upload = load(&path).unwrap();
        assert_eq!(upload.file_name, "shirt.jpg");
        assert_eq!(upload.image.mime_type, "image/png");
        assert_eq!(upload.image.data, png_bytes());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn falls_back_to_extension_then_octet_stream() {
        let dir = std::env::temp_dir().join("stylist_intake_fallback");
        std::fs::create_dir_all(&dir).unwrap();

        let heic = dir.join("photo.HEIC");
        std::fs::write(&heic, b"not really an image").unwrap();
        assert_eq!(load(&heic).unwrap().image.mime_type, "image/heic");

        let unknown = dir.join("notes.txt");
        std::fs::write(&unknown, b"hello").unwrap();
        assert_eq!(load(&unknown).unwrap().image.mime_type, FALLBACK_MIME);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_encoding_error() {
        let err = load(Path::new("/nonexistent/shirt.png")).unwrap_err();
        assert!(matches!(err, StylistError::Encoding(_)));
    }

    #[test]
    fn empty_file_is_an_encoding_error() {
        let path = std::env::temp_dir().join("stylist_intake_empty.png");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(load(&path).unwrap_err(), StylistError::Encoding(_)));
        let _ = std::fs::remove_file(&path);
    }
}
