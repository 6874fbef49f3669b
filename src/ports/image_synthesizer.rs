//! Image synthesizer port: outfit description in, flat-lay image out.

use serde::{Deserialize, Serialize};

use super::encoded_image::ImageFuture;

/// A request to render one outfit description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// The resolved model identifier (e.g., `"gemini-2.5-flash-image"`).
    pub model: String,
    /// The outfit description to interpolate into the flat-lay prompt.
    pub description: String,
    /// Optional aspect ratio (e.g., `"1:1"`).
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

/// Renders outfit descriptions into images.
pub trait ImageSynthesizer: Send + Sync {
    /// Render a single outfit description.
    fn synthesize(&self, request: &SynthesisRequest) -> ImageFuture<'_>;
}
