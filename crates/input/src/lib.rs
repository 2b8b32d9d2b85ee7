//! Input: platform key events mapped to a fixed set of movement and jump actions.
//!
//! # Invariants
//! - Platform handlers never touch `InputState`; they send `InputEvent`s.
//! - The frame loop is the single consumer and drains once per tick.
//! - Jump is edge triggered; held movement keys are level state.

pub mod action;
pub mod bindings;
pub mod events;
pub mod state;

pub use action::{Action, Direction};
pub use bindings::{InputError, Key, KeyBindings};
pub use events::{FrameInput, InputEvent, InputReceiver, InputSender, input_channel};
pub use state::InputState;
