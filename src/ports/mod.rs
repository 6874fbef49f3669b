//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the session core and the
//! generation service. Implementations live in `src/adapters/`.

pub mod encoded_image;
pub mod idea_generator;
pub mod image_editor;
pub mod image_synthesizer;

pub use encoded_image::EncodedImage;
pub use idea_generator::{IdeaGenerator, IdeaRequest, OutfitDescription};
pub use image_editor::{EditRequest, ImageEditor};
pub use image_synthesizer::{ImageSynthesizer, SynthesisRequest};
