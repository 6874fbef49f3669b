//! Service context that wires the stylist ports to live, recording or replaying adapters.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::gemini::GeminiClient;
use crate::adapters::recording::RecordingStylist;
use crate::adapters::replaying::ReplayingStylist;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::{Config, API_KEY_ENV_VARS};
use crate::error::StylistError;
use crate::session::Services;

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// Spawned calls may still hold the recorder after a quit; whatever was
    /// recorded up to now is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<(std::path::PathBuf, usize), String> {
        let mut guard = self.recorder.lock().map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        let recorder = std::mem::replace(&mut *guard, CassetteRecorder::new("", "", ""));
        drop(guard);
        let count = recorder.len();
        let path = recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))?;
        Ok((path, count))
    }
}

/// Create live services backed by the Gemini API.
///
/// # Errors
///
/// Returns an error if the API key is not configured.
pub fn live(config: &Config) -> Result<Services, StylistError> {
    let key = config
        .gemini_key()
        .ok_or_else(|| StylistError::MissingApiKey { env_var: API_KEY_ENV_VARS[0].into() })?;
    let client = Arc::new(GeminiClient::new(key, config.service.base_url.clone()));
    Ok(Services {
        ideas: Arc::clone(&client) as _,
        synthesizer: Arc::clone(&client) as _,
        editor: client,
    })
}

/// Create recording services that wrap the live client with a recorder.
///
/// # Errors
///
/// Returns an error if the live services cannot be created.
pub fn recording(config: &Config) -> Result<(Services, RecordingSession), StylistError> {
    let live = live(config)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
    let path = std::path::PathBuf::from(".stylist/cassettes")
        .join(&timestamp)
        .join("stylist.cassette.yaml");
    let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
        path,
        format!("{timestamp}-stylist"),
        get_commit_hash(),
    )));

    let stylist = Arc::new(RecordingStylist::new(
        live.ideas,
        live.synthesizer,
        live.editor,
        Arc::clone(&recorder),
    ));
    let services = Services {
        ideas: Arc::clone(&stylist) as _,
        synthesizer: Arc::clone(&stylist) as _,
        editor: stylist,
    };
    Ok((services, RecordingSession { recorder }))
}

/// Create replaying services from a cassette file.
///
/// # Errors
///
/// Returns an error if the cassette file cannot be loaded.
pub fn replaying(path: &Path) -> Result<Services, StylistError> {
    let replayer = load_cassette(path)
        .map_err(|e| StylistError::Config(format!("Failed to load cassette: {e}")))?;
    let stylist = Arc::new(ReplayingStylist::new(Arc::new(Mutex::new(replayer))));
    Ok(Services {
        ideas: Arc::clone(&stylist) as _,
        synthesizer: Arc::clone(&stylist) as _,
        editor: stylist,
    })
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
