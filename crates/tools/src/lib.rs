//! Developer tooling: read-only views of a running frame driver.

mod inspector;

pub use inspector::{FrameSummary, PairInfo, SceneInspector};
