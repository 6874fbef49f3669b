//! Drives [`SessionState`] by running its effects as concurrent service calls.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::state::{Effect, RevealPolicy, SessionEvent, SessionState, Transition};
use crate::error::StylistError;
use crate::intake::ClothingImage;
use crate::ports::{
    EditRequest, IdeaGenerator, IdeaRequest, ImageEditor, ImageSynthesizer, SynthesisRequest,
};

/// The service ports a session talks to.
#[derive(Clone)]
pub struct Services {
    /// Idea generator port.
    pub ideas: Arc<dyn IdeaGenerator>,
    /// Image synthesizer port.
    pub synthesizer: Arc<dyn ImageSynthesizer>,
    /// Image editor port.
    pub editor: Arc<dyn ImageEditor>,
}

/// Per-session request settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Model used for idea generation.
    pub ideas_model: String,
    /// Model used for synthesis and edits.
    pub image_model: String,
    /// Aspect ratio requested for renders.
    pub aspect_ratio: Option<String>,
    /// How renders are revealed.
    pub reveal: RevealPolicy,
}

/// Owns the session state and is the only thing that mutates it.
///
/// Service calls run as spawned tasks; each reports exactly one completion
/// back over a channel, which is applied when the owner calls
/// [`Coordinator::next_completion`].
pub struct Coordinator {
    state: SessionState,
    services: Services,
    settings: Settings,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    in_flight: usize,
}

impl Coordinator {
    /// Create a coordinator with a fresh session.
    #[must_use]
    pub fn new(services: Services, settings: Settings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(settings.reveal),
            services,
            settings,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of service calls whose completion has not been applied yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a new session for an uploaded photo. Must be called within a tokio runtime.
    pub fn upload(&mut self, image: ClothingImage) {
        self.dispatch(SessionEvent::Upload(image));
    }

    /// Submit an edit for an outfit. Returns `false` if the edit was ignored
    /// (unknown outfit, edit already in flight, or blank instruction).
    pub fn submit_edit(&mut self, id: &str, instruction: &str) -> bool {
        self.dispatch(SessionEvent::EditSubmitted {
            id: id.to_string(),
            instruction: instruction.to_string(),
        })
    }

    /// Start over. Calls still in flight finish but their results are dropped.
    pub fn reset(&mut self) {
        self.dispatch(SessionEvent::Reset);
    }

    /// Wait for the next service completion and apply it.
    ///
    /// Returns `None` when nothing is in flight, otherwise whether the
    /// completion changed the visible state (stale completions don't).
    pub async fn next_completion(&mut self) -> Option<bool> {
        if self.in_flight == 0 {
            return None;
        }
        // The coordinator keeps its own sender, so the channel never closes.
        let event = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(self.dispatch(event))
    }

    /// Apply completions until no service call is in flight. Returns whether
    /// any of them changed the visible state.
    pub async fn settle(&mut self) -> bool {
        let mut changed = false;
        while let Some(c) = self.next_completion().await {
            changed |= c;
        }
        changed
    }

    fn dispatch(&mut self, event: SessionEvent) -> bool {
        let Transition { effects, changed } = self.state.apply(event);
        for effect in effects {
            self.run(effect);
        }
        changed
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::GenerateIdeas { token, image } => {
                let ideas = Arc::clone(&self.services.ideas);
                let request = IdeaRequest { model: self.settings.ideas_model.clone(), image };
                let aborted = SessionEvent::IdeasGenerated {
                    token,
                    result: Err(StylistError::GenerationFailed("idea call aborted".into())),
                };
                self.spawn(
                    async move {
                        let result = ideas.generate_ideas(&request).await;
                        SessionEvent::IdeasGenerated { token, result }
                    },
                    aborted,
                );
            }
            Effect::Synthesize { token, index, description } => {
                let synthesizer = Arc::clone(&self.services.synthesizer);
                let request = SynthesisRequest {
                    model: self.settings.image_model.clone(),
                    description,
                    aspect_ratio: self.settings.aspect_ratio.clone(),
                };
                let aborted = SessionEvent::OutfitRendered {
                    token,
                    index,
                    result: Err(StylistError::GenerationFailed("render call aborted".into())),
                };
                self.spawn(
                    async move {
                        let result = synthesizer.synthesize(&request).await;
                        SessionEvent::OutfitRendered { token, index, result }
                    },
                    aborted,
                );
            }
            Effect::Edit { token, id, image, instruction } => {
                let editor = Arc::clone(&self.services.editor);
                let request =
                    EditRequest { model: self.settings.image_model.clone(), image, instruction };
                let aborted = SessionEvent::EditCompleted {
                    token,
                    id: id.clone(),
                    result: Err(StylistError::EditFailed("edit call aborted".into())),
                };
                self.spawn(
                    async move {
                        let result = editor.edit(&request).await;
                        SessionEvent::EditCompleted { token, id, result }
                    },
                    aborted,
                );
            }
        }
    }

    /// Run a service call on its own task. If the call panics, `aborted` is
    /// reported in its place so the in-flight count still drains.
    fn spawn<F>(&mut self, call: F, aborted: SessionEvent)
    where
        F: Future<Output = SessionEvent> + Send + 'static,
    {
        self.in_flight += 1;
        debug!(in_flight = self.in_flight, "Service call started");
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match tokio::spawn(call).await {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "Service call aborted");
                    aborted
                }
            };
            // The receiver lives as long as the coordinator; a send error means it is gone.
            let _ = tx.send(event);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tokio::sync::oneshot;

    use super::*;
    use crate::ports::encoded_image::ImageFuture;
    use crate::ports::idea_generator::IdeasFuture;
    use crate::ports::{EncodedImage, OutfitDescription};
    use crate::session::state::{Phase, GENERATION_FAILED_MESSAGE};

    /// In-memory stylist with scripted answers.
    #[derive(Default)]
    struct FakeStylist {
        /// `None` means answer with an unparsable response.
        ideas: Option<Vec<OutfitDescription>>,
        /// Descriptions whose render comes back without an image.
        failing_renders: HashSet<String>,
        /// Descriptions whose render call panics.
        panicking_renders: HashSet<String>,
        /// Edits keyed by instruction wait on these before answering.
        edit_gates: Mutex<HashMap<String, oneshot::Receiver<Option<EncodedImage>>>>,
        renders: AtomicUsize,
    }

    impl FakeStylist {
        fn with_ideas() -> Self {
            Self {
                ideas: Some(
                    ["Casual", "Business", "Night Out"]
                        .iter()
                        .map(|c| OutfitDescription {
                            category: (*c).to_string(),
                            description: format!("{c} look"),
                        })
                        .collect(),
                ),
                ..Self::default()
            }
        }

        fn gate(&self, instruction: &str) -> oneshot::Sender<Option<EncodedImage>> {
            let (tx, rx) = oneshot::channel();
            self.edit_gates.lock().unwrap().insert(instruction.to_string(), rx);
            tx
        }
    }

    impl IdeaGenerator for FakeStylist {
        fn generate_ideas(&self, _request: &IdeaRequest) -> IdeasFuture<'_> {
            let result = self
                .ideas
                .clone()
                .ok_or_else(|| StylistError::MalformedResponse("expected value".into()));
            Box::pin(async move { result })
        }
    }

    impl ImageSynthesizer for FakeStylist {
        fn synthesize(&self, request: &SynthesisRequest) -> ImageFuture<'_> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            if self.panicking_renders.contains(&request.description) {
                panic!("render for {} blew up", request.description);
            }
            let result = if self.failing_renders.contains(&request.description) {
                Err(StylistError::GenerationFailed("no image".into()))
            } else {
                Ok(image(request.description.as_bytes()))
            };
            Box::pin(async move { result })
        }
    }

    impl ImageEditor for FakeStylist {
        fn edit(&self, request: &EditRequest) -> ImageFuture<'_> {
            let gate = self.edit_gates.lock().unwrap().remove(&request.instruction);
            let instant = image(request.instruction.as_bytes());
            Box::pin(async move {
                let answer = match gate {
                    Some(rx) => rx.await.ok().flatten(),
                    None => Some(instant),
                };
                answer.ok_or_else(|| StylistError::EditFailed("no image".into()))
            })
        }
    }

    fn image(data: &[u8]) -> EncodedImage {
        EncodedImage { data: data.to_vec(), mime_type: "image/png".into() }
    }

    fn upload() -> ClothingImage {
        ClothingImage { file_name: "skirt.jpg".into(), image: image(b"skirt") }
    }

    fn coordinator(fake: &Arc<FakeStylist>, reveal: RevealPolicy) -> Coordinator {
        let services = Services {
            ideas: Arc::clone(fake) as Arc<dyn IdeaGenerator>,
            synthesizer: Arc::clone(fake) as Arc<dyn ImageSynthesizer>,
            editor: Arc::clone(fake) as Arc<dyn ImageEditor>,
        };
        let settings = Settings {
            ideas_model: "gemini-2.5-pro".into(),
            image_model: "gemini-2.5-flash-image".into(),
            aspect_ratio: None,
            reveal,
        };
        Coordinator::new(services, settings)
    }

    async fn ready(fake: &Arc<FakeStylist>) -> Coordinator {
        let mut c = coordinator(fake, RevealPolicy::AllOrNothing);
        c.upload(upload());
        c.settle().await;
        assert_eq!(c.state().phase(), Phase::Ready);
        c
    }

    #[tokio::test]
    async fn upload_produces_three_ready_outfits() {
        let fake = Arc::new(FakeStylist::with_ideas());
        let c = ready(&fake).await;

        let state = c.state();
        let ids: Vec<&str> = state.outfits().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["Casual", "Business", "Night Out"]);
        assert_eq!(state.outfit("Business").unwrap().image, image(b"Business look"));
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(c.in_flight(), 0);
        assert_eq!(fake.renders.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn malformed_ideas_leave_empty_error_state() {
        let fake = Arc::new(FakeStylist::default());
        let mut c = coordinator(&fake, RevealPolicy::AllOrNothing);
        c.upload(upload());
        c.settle().await;

        let state = c.state();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.is_loading());
        assert!(state.outfits().is_empty());
        assert_eq!(state.error().unwrap().message, GENERATION_FAILED_MESSAGE);
        assert_eq!(fake.renders.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_business_render_fails_whole_batch() {
        let mut fake = FakeStylist::with_ideas();
        fake.failing_renders.insert("Business look".into());
        let fake = Arc::new(fake);
        let mut c = coordinator(&fake, RevealPolicy::AllOrNothing);
        c.upload(upload());
        c.settle().await;

        assert!(c.state().outfits().is_empty());
        assert_eq!(c.state().error().unwrap().message, GENERATION_FAILED_MESSAGE);
        // Siblings were not aborted.
        assert_eq!(fake.renders.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn panicking_render_still_completes() {
        let mut fake = FakeStylist::with_ideas();
        fake.panicking_renders.insert("Night Out look".into());
        let fake = Arc::new(fake);
        let mut c = coordinator(&fake, RevealPolicy::AllOrNothing);
        c.upload(upload());
        c.settle().await;

        assert_eq!(c.in_flight(), 0);
        let state = c.state();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.outfits().is_empty());
        assert_eq!(state.error().unwrap().message, GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn incremental_keeps_surviving_outfits() {
        let mut fake = FakeStylist::with_ideas();
        fake.failing_renders.insert("Business look".into());
        let fake = Arc::new(fake);
        let mut c = coordinator(&fake, RevealPolicy::Incremental);
        c.upload(upload());
        c.settle().await;

        let ids: Vec<&str> = c.state().outfits().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["Casual", "Night Out"]);
        assert_eq!(c.state().phase(), Phase::Ready);
        assert_eq!(c.state().error().unwrap().outfit.as_deref(), Some("Business"));
    }

    #[tokio::test]
    async fn concurrent_edits_do_not_interfere() {
        let fake = Arc::new(FakeStylist::with_ideas());
        let mut c = ready(&fake).await;
        let business_before = c.state().outfit("Business").unwrap().image.clone();

        let casual_gate = fake.gate("add a hat");
        let business_gate = fake.gate("add a belt");
        assert!(c.submit_edit("Casual", "add a hat"));
        assert!(c.submit_edit("Business", "add a belt"));
        assert_eq!(c.in_flight(), 2);

        casual_gate.send(Some(image(b"hatted"))).unwrap();
        assert_eq!(c.next_completion().await, Some(true));
        assert_eq!(c.state().outfit("Casual").unwrap().image, image(b"hatted"));
        assert!(!c.state().is_editing("Casual"));
        assert!(c.state().is_editing("Business"));
        assert_eq!(c.state().outfit("Business").unwrap().image, business_before);

        business_gate.send(None).unwrap();
        assert_eq!(c.next_completion().await, Some(true));
        assert!(!c.state().is_editing("Business"));
        assert_eq!(c.state().outfit("Business").unwrap().image, business_before);
        assert_eq!(c.state().outfit("Casual").unwrap().image, image(b"hatted"));
        assert_eq!(c.state().error().unwrap().outfit.as_deref(), Some("Business"));
        assert_eq!(c.next_completion().await, None);
    }

    #[tokio::test]
    async fn second_edit_on_same_outfit_is_refused_while_first_runs() {
        let fake = Arc::new(FakeStylist::with_ideas());
        let mut c = ready(&fake).await;
        let gate = fake.gate("slow");

        assert!(c.submit_edit("Casual", "slow"));
        assert!(!c.submit_edit("Casual", "fast"));
        assert!(!c.submit_edit("Gala", "anything"));
        assert_eq!(c.in_flight(), 1);

        gate.send(Some(image(b"slow"))).unwrap();
        c.settle().await;
        assert_eq!(c.state().outfit("Casual").unwrap().image, image(b"slow"));
    }

    #[tokio::test]
    async fn reset_while_generating_discards_late_results() {
        let fake = Arc::new(FakeStylist::with_ideas());
        let mut c = coordinator(&fake, RevealPolicy::AllOrNothing);
        c.upload(upload());
        c.reset();
        c.settle().await;

        let state = c.state();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.upload().is_none());
        assert!(state.outfits().is_empty());
        assert!(state.error().is_none());
        assert_eq!(fake.renders.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reset_while_editing_drops_the_edit() {
        let fake = Arc::new(FakeStylist::with_ideas());
        let mut c = ready(&fake).await;
        let gate = fake.gate("sparkle");
        c.submit_edit("Night Out", "sparkle");
        c.reset();

        gate.send(Some(image(b"sparkly"))).unwrap();
        assert_eq!(c.next_completion().await, Some(false));
        assert!(c.state().outfits().is_empty());
        assert!(!c.state().is_editing("Night Out"));
    }

    #[tokio::test]
    async fn reupload_only_applies_latest_session() {
        let fake = Arc::new(FakeStylist::with_ideas());
        let mut c = coordinator(&fake, RevealPolicy::AllOrNothing);
        c.upload(upload());
        c.upload(upload());
        c.settle().await;

        assert_eq!(c.state().outfits().len(), 3);
        assert_eq!(fake.renders.load(Ordering::SeqCst), 3);
    }
}
