//! Recording adapter for the stylist ports.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::encoded_image::ImageFuture;
use crate::ports::idea_generator::IdeasFuture;
use crate::ports::{
    EditRequest, IdeaGenerator, IdeaRequest, ImageEditor, ImageSynthesizer, SynthesisRequest,
};

/// Records every port call while delegating to inner implementations.
pub struct RecordingStylist {
    ideas: Arc<dyn IdeaGenerator>,
    synthesizer: Arc<dyn ImageSynthesizer>,
    editor: Arc<dyn ImageEditor>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingStylist {
    /// Creates a recording wrapper around the given implementations.
    pub fn new(
        ideas: Arc<dyn IdeaGenerator>,
        synthesizer: Arc<dyn ImageSynthesizer>,
        editor: Arc<dyn ImageEditor>,
        recorder: Arc<Mutex<CassetteRecorder>>,
    ) -> Self {
        Self { ideas, synthesizer, editor, recorder }
    }
}

impl IdeaGenerator for RecordingStylist {
    fn generate_ideas(&self, request: &IdeaRequest) -> IdeasFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.ideas.generate_ideas(&request).await;
            record_result(&self.recorder, "idea_generator", "generate_ideas", &request, &result);
            result
        })
    }
}

impl ImageSynthesizer for RecordingStylist {
    fn synthesize(&self, request: &SynthesisRequest) -> ImageFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.synthesizer.synthesize(&request).await;
            record_result(&self.recorder, "image_synthesizer", "synthesize", &request, &result);
            result
        })
    }
}

impl ImageEditor for RecordingStylist {
    fn edit(&self, request: &EditRequest) -> ImageFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.editor.edit(&request).await;
            record_result(&self.recorder, "image_editor", "edit", &request, &result);
            result
        })
    }
}
