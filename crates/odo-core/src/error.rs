//! Error types for the odo PDR system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed frame: {reason}")]
    MalformedFrame { reason: String },

    #[error("step-length estimation failed: {0}")]
    Estimation(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("model loading error: {0}")]
    ModelLoad(String),

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("insufficient data: need {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
