use knockabout_input::InputError;
use knockabout_kernel::PhysicsError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("physics: {0}")]
    Physics(#[from] PhysicsError),
    #[error("input: {0}")]
    Input(#[from] InputError),
    #[error("invalid scene config: {0}")]
    InvalidConfig(String),
    #[error("scene has no controlled body")]
    NoControlledBody,
    #[error("unknown preset {0:?}, expected one of: {known}", known = crate::config::PRESETS.join(", "))]
    UnknownPreset(String),
}
