//! # Odo-Core
//!
//! Core types and utilities for the odo indoor pedestrian
//! dead-reckoning system.

pub mod config;
pub mod error;
pub mod estimator;
pub mod scaler;
pub mod types;

pub use config::{ArtifactConfig, EngineConfig, SerialConfig, SessionConfig};
pub use error::{Error, Result};
pub use estimator::StepLengthEstimator;
pub use scaler::StandardScaler;
pub use types::{
    FeatureVector, Position2D, SensorFrame, SessionId, Sex, StepRecord, WalkerProfile,
};
