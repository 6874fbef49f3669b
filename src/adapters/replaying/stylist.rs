//! Replaying adapter for the stylist ports.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::StylistError;
use crate::ports::encoded_image::ImageFuture;
use crate::ports::idea_generator::IdeasFuture;
use crate::ports::{
    EditRequest, EncodedImage, IdeaGenerator, IdeaRequest, ImageEditor, ImageSynthesizer,
    OutfitDescription, SynthesisRequest,
};

/// Serves recorded stylist results from a cassette.
pub struct ReplayingStylist {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingStylist {
    /// Create a replaying stylist backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }

    fn replay<T, I>(&self, port: &str, method: &str, input: &I) -> Result<T, StylistError>
    where
        T: serde::de::DeserializeOwned,
        I: serde::Serialize,
    {
        let output = next_output(&self.replayer, port, method, input)
            .map_err(|message| StylistError::Api { status: 0, message })?;
        replay_result::<T>(output).map_err(|e| StylistError::Api { status: 0, message: e.to_string() })
    }
}

impl IdeaGenerator for ReplayingStylist {
    fn generate_ideas(&self, request: &IdeaRequest) -> IdeasFuture<'_> {
        let result =
            self.replay::<Vec<OutfitDescription>, _>("idea_generator", "generate_ideas", request);
        Box::pin(async move { result })
    }
}

impl ImageSynthesizer for ReplayingStylist {
    fn synthesize(&self, request: &SynthesisRequest) -> ImageFuture<'_> {
        let result = self.replay::<EncodedImage, _>("image_synthesizer", "synthesize", request);
        Box::pin(async move { result })
    }
}

impl ImageEditor for ReplayingStylist {
    fn edit(&self, request: &EditRequest) -> ImageFuture<'_> {
        let result = self.replay::<EncodedImage, _>("image_editor", "edit", request);
        Box::pin(async move { result })
    }
}
