//! The Ritual conversation engine.
//!
//! A data-driven dialogue state machine: the dialogue graph (screens,
//! prompts, choices) lives in the store, the user's current screen is the
//! only state variable, and actions are dispatched through a closed
//! registry. The engine talks to the messaging collaborator exclusively
//! through the [`Transport`](transport::Transport) trait.

pub mod action;
pub mod engine;
pub mod error;
pub mod seed;
pub mod transport;

pub use action::Action;
pub use engine::{ActionEvent, Engine, TextEvent};
pub use error::{Error, Result};
