//! Interactive terminal session: reads commands, drives the coordinator and
//! writes images to the output directory as they land.

pub mod command;
pub mod view;

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::error::StylistError;
use crate::intake;
use crate::output::{save_outfit, save_upload};
use crate::ports::EncodedImage;
use crate::session::Coordinator;

use command::{parse_command, Command, HELP};

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// A terminal front end over one [`Coordinator`].
pub struct Terminal {
    coordinator: Coordinator,
    output_dir: PathBuf,
    /// Last image written per outfit id, so unchanged outfits aren't rewritten.
    saved: HashMap<String, EncodedImage>,
}

impl Terminal {
    /// Create a terminal writing images under `output_dir`.
    #[must_use]
    pub fn new(coordinator: Coordinator, output_dir: PathBuf) -> Self {
        Self { coordinator, output_dir, saved: HashMap::new() }
    }

    /// Upload a photo from disk and start styling it.
    ///
    /// # Errors
    ///
    /// Returns an error if the photo cannot be read. The session is left untouched.
    pub fn upload(&mut self, path: &std::path::Path) -> Result<(), StylistError> {
        let image = intake::load(path)?;
        match save_upload(&self.output_dir, &image) {
            Ok(saved) => info!(path = %saved.display(), "saved uploaded item"),
            Err(e) => warn!(error = %e, "could not save uploaded item"),
        }
        self.saved.clear();
        self.coordinator.upload(image);
        Ok(())
    }

    /// Run the command loop until `quit` or end of input.
    ///
    /// Completions are applied while waiting for input. On quit or end of
    /// input, pending calls are awaited before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input fails.
    pub async fn run<R>(mut self, input: R) -> Result<(), StylistError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.show();

        loop {
            let in_flight = self.coordinator.in_flight() > 0;
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("input closed");
                        break;
                    };
                    match parse_command(&line) {
                        Ok(Some(command)) => {
                            if self.handle(command).await == Flow::Quit {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(usage) => eprintln!("{usage}"),
                    }
                }
                Some(changed) = self.coordinator.next_completion(), if in_flight => {
                    if changed {
                        self.persist();
                        self.show();
                    }
                }
            }
        }

        self.drain().await;
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Upload(path) => match self.upload(&path) {
                Ok(()) => self.show(),
                Err(e) => eprintln!("Error: {e}"),
            },
            Command::Edit { outfit, instruction } => self.edit(&outfit, &instruction),
            Command::Show => self.show(),
            Command::Wait => {
                self.drain().await;
            }
            Command::Reset => {
                self.coordinator.reset();
                self.saved.clear();
                self.show();
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn edit(&mut self, query: &str, instruction: &str) {
        let state = self.coordinator.state();
        let Some(id) = state.resolve_id(query).map(str::to_string) else {
            let known: Vec<&str> = state.outfits().iter().map(|o| o.id.as_str()).collect();
            if known.is_empty() {
                eprintln!("No outfits to edit yet.");
            } else {
                eprintln!("No outfit '{query}'. Outfits: {}", known.join(", "));
            }
            return;
        };
        if state.is_editing(&id) {
            eprintln!("The {id} outfit is still being edited.");
            return;
        }
        if self.coordinator.submit_edit(&id, instruction) {
            self.show();
        } else {
            eprintln!("Edit for {id} was not accepted.");
        }
    }

    /// Apply completions until nothing is in flight, then print the view.
    async fn drain(&mut self) {
        if self.coordinator.settle().await {
            self.persist();
            self.show();
        }
    }

    /// Write every outfit image that differs from what is on disk.
    fn persist(&mut self) {
        for outfit in self.coordinator.state().outfits() {
            if self.saved.get(&outfit.id) == Some(&outfit.image) {
                continue;
            }
            match save_outfit(&self.output_dir, outfit) {
                Ok(path) => {
                    info!(outfit = %outfit.id, path = %path.display(), "saved outfit image");
                    self.saved.insert(outfit.id.clone(), outfit.image.clone());
                }
                Err(e) => warn!(outfit = %outfit.id, error = %e, "could not save outfit image"),
            }
        }
    }

    fn show(&self) {
        println!("{}", view::render(self.coordinator.state(), &self.output_dir));
    }
}
