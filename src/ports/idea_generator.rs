//! Idea generator port: clothing photo in, outfit descriptions out.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::EncodedImage;
use crate::error::StylistError;

/// A request to generate outfit ideas for an uploaded item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaRequest {
    /// The resolved model identifier (e.g., `"gemini-2.5-pro"`).
    pub model: String,
    /// The uploaded clothing photo.
    pub image: EncodedImage,
}

/// One outfit idea as returned by the stylist model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitDescription {
    /// Category label, e.g. `"Casual"`.
    pub category: String,
    /// Free-text description of the complete outfit.
    pub description: String,
}

/// Boxed future type returned by [`IdeaGenerator::generate_ideas`].
pub type IdeasFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<OutfitDescription>, StylistError>> + Send + 'a>>;

/// Produces outfit descriptions from a photo of a single clothing item.
pub trait IdeaGenerator: Send + Sync {
    /// Generate outfit ideas for the given request.
    fn generate_ideas(&self, request: &IdeaRequest) -> IdeasFuture<'_>;
}
