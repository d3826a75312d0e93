//! Frame-stepped two-player fireball duel.
//!
//! The crate is the simulation core: entities, the shared particle pool,
//! collision, the scripted opponent and the match state machine. Drawing,
//! sound and controller polling are collaborators supplied by the caller
//! through [`platform::Host`].

pub mod ai;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod input;
pub mod particles;
pub mod platform;
pub mod rng;

pub use compute::{init, tick};
pub use config::{AiPolicy, MatchConfig};
pub use entities::{ControlSource, Match, Phase};
pub use input::{Buttons, InputSnapshot};
pub use platform::Host;
