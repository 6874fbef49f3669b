//! Adapter implementations for port traits.
//!
//! - `live/` - Gemini REST client
//! - `recording/` - Record interactions to cassettes
//! - `replaying/` - Replay interactions from cassettes

pub mod live;
pub mod recording;
pub mod replaying;
