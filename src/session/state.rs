//! Session state and its transitions.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::error::StylistError;
use crate::intake::ClothingImage;
use crate::output::{outfit_stem, UPLOAD_STEM};
use crate::ports::{EncodedImage, OutfitDescription};

/// Banner shown when ideas or renders fail under the all-or-nothing policy.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate outfit ideas. Please try again.";

/// Where the session is in its lifecycle. Errors overlay any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing in flight; either no upload yet, or the last generation failed.
    #[default]
    Idle,
    /// Ideas or renders are in flight.
    Generating,
    /// Outfits are on display; individual outfits may be editing.
    Ready,
}

/// How synthesis results are revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealPolicy {
    /// Wait for every render; any failure fails the whole batch.
    #[default]
    AllOrNothing,
    /// Show each outfit as soon as its render lands; failures are per outfit.
    Incremental,
}

impl RevealPolicy {
    /// Parse a policy name as used in config and on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is neither `all` nor `incremental`.
    pub fn from_name(name: &str) -> Result<Self, String> {
        crate::params::validate_reveal(name)?;
        Ok(if name == "incremental" { Self::Incremental } else { Self::AllOrNothing })
    }
}

/// One generated outfit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outfit {
    /// Unique id within the session, normally the category.
    pub id: String,
    /// Category label as returned by the stylist.
    pub category: String,
    /// Outfit description.
    pub description: String,
    /// Current rendering; replaced wholesale by each successful edit.
    pub image: EncodedImage,
}

/// A user-visible error, optionally tied to one outfit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    /// Banner text.
    pub message: String,
    /// Id of the outfit the error concerns, if any.
    pub outfit: Option<String>,
}

/// Input to the state machine: user actions and service completions.
#[derive(Debug)]
pub enum SessionEvent {
    /// A new photo was uploaded.
    Upload(ClothingImage),
    /// The idea generator finished.
    IdeasGenerated {
        /// Session token the call was issued under.
        token: u64,
        /// The ideas, or why there are none.
        result: Result<Vec<OutfitDescription>, StylistError>,
    },
    /// One synthesis finished.
    OutfitRendered {
        /// Session token the call was issued under.
        token: u64,
        /// Position of the idea this render belongs to.
        index: usize,
        /// The image, or why there is none.
        result: Result<EncodedImage, StylistError>,
    },
    /// The user asked to edit an outfit.
    EditSubmitted {
        /// Target outfit id.
        id: String,
        /// Free-text instruction.
        instruction: String,
    },
    /// An edit call finished.
    EditCompleted {
        /// Session token the call was issued under.
        token: u64,
        /// Edited outfit id.
        id: String,
        /// The replacement image, or why there is none.
        result: Result<EncodedImage, StylistError>,
    },
    /// The user chose to start over.
    Reset,
}

/// A service call the coordinator must issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the stylist for outfit ideas.
    GenerateIdeas {
        /// Session token to stamp the completion with.
        token: u64,
        /// The uploaded photo.
        image: EncodedImage,
    },
    /// Render one idea.
    Synthesize {
        /// Session token to stamp the completion with.
        token: u64,
        /// Index of the idea in the batch.
        index: usize,
        /// Description to render.
        description: String,
    },
    /// Edit one outfit's current image.
    Edit {
        /// Session token to stamp the completion with.
        token: u64,
        /// Outfit id.
        id: String,
        /// The image to edit.
        image: EncodedImage,
        /// Free-text instruction.
        instruction: String,
    },
}

/// Result of applying one event.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Transition {
    /// Service calls to start.
    pub effects: Vec<Effect>,
    /// Whether the visible state changed.
    pub changed: bool,
}

impl Transition {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(effects: Vec<Effect>) -> Self {
        Self { effects, changed: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Pending,
    Rendered(EncodedImage),
    Failed,
}

/// Join barrier over the renders of one idea batch.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Batch {
    ideas: Vec<OutfitDescription>,
    ids: Vec<String>,
    slots: Vec<Slot>,
}

impl Batch {
    fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| *s != Slot::Pending)
    }

    fn outfit(&self, index: usize, image: EncodedImage) -> Outfit {
        Outfit {
            id: self.ids[index].clone(),
            category: self.ideas[index].category.clone(),
            description: self.ideas[index].description.clone(),
            image,
        }
    }
}

/// Everything the session shows, owned by the coordinator.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    policy: RevealPolicy,
    token: u64,
    phase: Phase,
    upload: Option<ClothingImage>,
    outfits: Vec<Outfit>,
    editing: BTreeSet<String>,
    error: Option<SessionError>,
    batch: Option<Batch>,
}

impl SessionState {
    /// A fresh session using the given reveal policy.
    #[must_use]
    pub fn new(policy: RevealPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether ideas or renders are in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Generating
    }

    /// The uploaded photo; its presence selects the results view over the upload prompt.
    #[must_use]
    pub fn upload(&self) -> Option<&ClothingImage> {
        self.upload.as_ref()
    }

    /// Outfits on display, in idea order.
    #[must_use]
    pub fn outfits(&self) -> &[Outfit] {
        &self.outfits
    }

    /// Look up an outfit by exact id.
    #[must_use]
    pub fn outfit(&self, id: &str) -> Option<&Outfit> {
        self.outfits.iter().find(|o| o.id == id)
    }

    /// Whether an edit is in flight for the given outfit.
    #[must_use]
    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.contains(id)
    }

    /// The current error banner, if any.
    #[must_use]
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Current session token; completions stamped with any other value are stale.
    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Resolve a loosely typed outfit id: case-insensitive, with `-` and `_`
    /// standing in for spaces (`night-out` finds `Night Out`).
    #[must_use]
    pub fn resolve_id(&self, query: &str) -> Option<&str> {
        let wanted = normalize_id(query);
        self.outfits.iter().map(|o| o.id.as_str()).find(|id| normalize_id(id) == wanted)
    }

    /// Apply one event and report the service calls it requires.
    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        match event {
            SessionEvent::Upload(upload) => self.on_upload(upload),
            SessionEvent::IdeasGenerated { token, result } => {
                if self.is_stale(token, "ideas") {
                    return Transition::unchanged();
                }
                self.on_ideas(result)
            }
            SessionEvent::OutfitRendered { token, index, result } => {
                if self.is_stale(token, "render") {
                    return Transition::unchanged();
                }
                self.on_rendered(index, result)
            }
            SessionEvent::EditSubmitted { id, instruction } => self.on_edit_submitted(id, instruction),
            SessionEvent::EditCompleted { token, id, result } => {
                if self.is_stale(token, "edit") {
                    return Transition::unchanged();
                }
                self.on_edit_completed(&id, result)
            }
            SessionEvent::Reset => {
                *self = Self { policy: self.policy, token: self.token + 1, ..Self::default() };
                debug!(token = self.token, "Session reset");
                Transition::changed(Vec::new())
            }
        }
    }

    fn is_stale(&self, token: u64, what: &str) -> bool {
        let stale = token != self.token;
        if stale {
            debug!(token, current = self.token, what, "Discarding stale completion");
        }
        stale
    }

    fn on_upload(&mut self, upload: ClothingImage) -> Transition {
        let image = upload.image.clone();
        *self = Self {
            policy: self.policy,
            token: self.token + 1,
            phase: Phase::Generating,
            upload: Some(upload),
            ..Self::default()
        };
        debug!(token = self.token, mime = %image.mime_type, bytes = image.data.len(), "Upload accepted");
        Transition::changed(vec![Effect::GenerateIdeas { token: self.token, image }])
    }

    fn on_ideas(&mut self, result: Result<Vec<OutfitDescription>, StylistError>) -> Transition {
        if self.phase() != Phase::Generating || self.batch.is_some() {
            return Transition::unchanged();
        }
        let ideas = match result {
            Ok(ideas) if !ideas.is_empty() => ideas,
            Ok(_) => {
                warn!("Idea generator returned no outfits");
                return self.fail_generation();
            }
            Err(e) => {
                warn!(error = %e, "Idea generation failed");
                return self.fail_generation();
            }
        };

        let ids = assign_ids(&ideas);
        let effects = ideas
            .iter()
            .enumerate()
            .map(|(index, idea)| Effect::Synthesize {
                token: self.token,
                index,
                description: idea.description.clone(),
            })
            .collect();
        debug!(count = ideas.len(), "Ideas received, rendering");
        self.batch = Some(Batch { slots: vec![Slot::Pending; ideas.len()], ideas, ids });
        Transition::changed(effects)
    }

    fn on_rendered(&mut self, index: usize, result: Result<EncodedImage, StylistError>) -> Transition {
        let policy = self.policy;
        let Some(batch) = self.batch.as_mut() else {
            return Transition::unchanged();
        };
        if batch.slots.get(index) != Some(&Slot::Pending) {
            return Transition::unchanged();
        }

        match result {
            Ok(image) => {
                if policy == RevealPolicy::Incremental {
                    let position = batch.slots[..index]
                        .iter()
                        .filter(|s| matches!(s, Slot::Rendered(_)))
                        .count();
                    self.outfits.insert(position, batch.outfit(index, image.clone()));
                }
                batch.slots[index] = Slot::Rendered(image);
            }
            Err(e) => {
                warn!(index, category = %batch.ideas[index].category, error = %e, "Render failed");
                if policy == RevealPolicy::Incremental {
                    self.error = Some(SessionError {
                        message: format!(
                            "Failed to generate the {} outfit image.",
                            batch.ideas[index].category
                        ),
                        outfit: Some(batch.ids[index].clone()),
                    });
                }
                batch.slots[index] = Slot::Failed;
            }
        }

        if !batch.is_complete() {
            return Transition::changed(Vec::new());
        }

        let Some(batch) = self.batch.take() else {
            return Transition::unchanged();
        };
        match policy {
            RevealPolicy::AllOrNothing => {
                let mut outfits = Vec::with_capacity(batch.slots.len());
                for (i, slot) in batch.slots.iter().enumerate() {
                    match slot {
                        Slot::Rendered(image) => outfits.push(batch.outfit(i, image.clone())),
                        Slot::Pending | Slot::Failed => return self.fail_generation(),
                    }
                }
                self.outfits = outfits;
            }
            RevealPolicy::Incremental => {
                if self.outfits.is_empty() {
                    return self.fail_generation();
                }
            }
        }
        self.phase = Phase::Ready;
        debug!(count = self.outfits.len(), "Outfits ready");
        Transition::changed(Vec::new())
    }

    fn fail_generation(&mut self) -> Transition {
        self.phase = Phase::Idle;
        self.outfits.clear();
        self.batch = None;
        self.error = Some(SessionError { message: GENERATION_FAILED_MESSAGE.into(), outfit: None });
        Transition::changed(Vec::new())
    }

    fn on_edit_submitted(&mut self, id: String, instruction: String) -> Transition {
        if instruction.trim().is_empty() || self.editing.contains(&id) {
            return Transition::unchanged();
        }
        let Some(outfit) = self.outfit(&id) else {
            return Transition::unchanged();
        };
        let image = outfit.image.clone();

        self.editing.insert(id.clone());
        self.error = None;
        debug!(%id, "Edit started");
        Transition::changed(vec![Effect::Edit { token: self.token, id, image, instruction }])
    }

    fn on_edit_completed(&mut self, id: &str, result: Result<EncodedImage, StylistError>) -> Transition {
        if !self.editing.remove(id) {
            return Transition::unchanged();
        }
        match result {
            Ok(image) => {
                if let Some(outfit) = self.outfits.iter_mut().find(|o| o.id == id) {
                    outfit.image = image;
                }
                debug!(%id, "Edit applied");
            }
            Err(e) => {
                warn!(%id, error = %e, "Edit failed");
                self.error = Some(SessionError {
                    message: format!("Failed to edit the {id} outfit. Please try another prompt."),
                    outfit: Some(id.to_string()),
                });
            }
        }
        Transition::changed(Vec::new())
    }
}

/// Assign session-unique ids: the category when usable, otherwise `outfit-{n}`.
///
/// An id is usable only if no earlier id resolves to it loosely (see
/// [`SessionState::resolve_id`]) and its file stem is neither taken nor the
/// uploaded item's.
#[must_use]
pub fn assign_ids(ideas: &[OutfitDescription]) -> Vec<String> {
    let mut keys = HashSet::new();
    let mut stems = HashSet::from([UPLOAD_STEM.to_string()]);
    let is_free = |id: &str, keys: &HashSet<String>, stems: &HashSet<String>| {
        !keys.contains(&normalize_id(id)) && !stems.contains(&outfit_stem(id))
    };

    let mut ids = Vec::with_capacity(ideas.len());
    for (i, idea) in ideas.iter().enumerate() {
        let category = idea.category.trim();
        let mut id = if !category.is_empty() && is_free(category, &keys, &stems) {
            category.to_string()
        } else {
            format!("outfit-{}", i + 1)
        };
        let mut suffix = 2;
        while !is_free(&id, &keys, &stems) {
            id = format!("outfit-{}-{suffix}", i + 1);
            suffix += 1;
        }
        keys.insert(normalize_id(&id));
        stems.insert(outfit_stem(&id));
        ids.push(id);
    }
    ids
}

fn normalize_id(id: &str) -> String {
    id.trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect()
}
