//! Image editor port: existing image plus instruction in, replacement image out.

use serde::{Deserialize, Serialize};

use super::encoded_image::ImageFuture;
use super::EncodedImage;

/// A request to modify an outfit image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// The resolved model identifier.
    pub model: String,
    /// The outfit's current image.
    pub image: EncodedImage,
    /// Free-text edit instruction, e.g. `"add a gold necklace"`.
    pub instruction: String,
}

/// Applies free-text edits to existing images.
pub trait ImageEditor: Send + Sync {
    /// Produce a replacement image for the given request.
    fn edit(&self, request: &EditRequest) -> ImageFuture<'_>;
}
