//! Shared value types: transforms, poses, viewports, colors.
//!
//! # Invariants
//! - Everything here is plain data; no type owns engine state.

mod color;
mod types;

pub use color::{Color, ColorParseError};
pub use types::{Pose, Transform, Viewport};
