use thiserror::Error;

/// Errors surfaced while building or mounting an orb.
///
/// Animation itself never fails; these only come from parsing configuration,
/// constructing curves, or setting up the WebGL backend.
#[derive(Debug, Error)]
pub enum OrbError {
    #[error("configuration parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("invalid keyframes: {0}")]
    InvalidKeyframes(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, OrbError>;
