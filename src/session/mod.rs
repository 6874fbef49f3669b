//! Session core: the outfit state machine and the coordinator that drives it.
//!
//! [`state::SessionState`] holds everything the user sees and changes only
//! through [`state::SessionState::apply`]. [`coordinator::Coordinator`] turns
//! the effects of each transition into service calls and feeds their
//! completions back in as events.

pub mod coordinator;
pub mod state;

pub use coordinator::{Coordinator, Services, Settings};
pub use state::{Outfit, RevealPolicy, SessionState};
