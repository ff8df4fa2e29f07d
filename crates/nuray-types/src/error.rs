use thiserror::Error;

#[derive(Error, Debug)]
pub enum NurayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type NurayResult<T> = Result<T, NurayError>;
