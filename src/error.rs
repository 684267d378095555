use std::path::PathBuf;

/// Errors surfaced by the game. Most runtime trouble (camera misses, missing
/// images, no audio device) is absorbed where it happens; what reaches this
/// type is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to load image {path}: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "webcam")]
    #[error("camera error: {0}")]
    Camera(#[from] opencv::Error),

    #[cfg(feature = "webcam")]
    #[error("landmark model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, Error>;
