//! Computer-controlled opponent (§4.13-§4.15).
//!
//! The AI observes simulation state through read-only snapshots and emits
//! [`actions::Action`]s; it never mutates [`crate::entities::EntityStorage`]
//! directly. Per-player AI memory lives in an explicit, serializable
//! [`state::AIWorld`] rather than a singleton/thread-local, so a headless
//! runner can drive many concurrent matches deterministically (§5).

pub mod actions;
pub mod investment;
pub mod personality;
pub mod state;
pub mod strategy;
pub mod threat;

pub use actions::{Action, ActionError};
pub use personality::Personality;
pub use state::{AIPlayerState, AIWorld};
pub use strategy::Strategy;
