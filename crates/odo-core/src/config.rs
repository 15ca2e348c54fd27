//! Session configuration.
//!
//! Everything here is established before the loop starts and never re-read
//! afterwards; the engine only ever sees already-validated values.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::WalkerProfile;

/// Complete configuration for one live session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Serial link configuration
    pub serial: SerialConfig,

    /// Walker constants fed into every feature vector
    pub walker: WalkerProfile,

    /// Engine parameters (window, sampling interval, clamp bounds)
    pub engine: EngineConfig,

    /// Pre-built artifact and output locations
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial device path (e.g. `/dev/ttyUSB0` or `COM3`)
    pub port: String,

    /// Fixed baud rate of the sensor link
    pub baud_rate: u32,

    /// Blocking read timeout; a timeout yields an empty read, not an error
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Observation window capacity W
    pub window_size: usize,

    /// Sampling interval in seconds, matching the sensor's sample rate
    pub dt_s: f64,

    /// Lower clamp bound for estimated step lengths (meters)
    pub min_step_m: f64,

    /// Upper clamp bound for estimated step lengths (meters)
    pub max_step_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Pre-fit feature scaler (JSON)
    pub scaler_path: PathBuf,

    /// Step-length network checkpoint (safetensors)
    pub model_path: PathBuf,

    /// Session log written once at flush time
    pub output_path: PathBuf,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 1_000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            dt_s: 0.02,
            min_step_m: 0.3,
            max_step_m: 1.5,
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            scaler_path: PathBuf::from("artifacts/scaler.json"),
            model_path: PathBuf::from("artifacts/model.safetensors"),
            output_path: PathBuf::from("trajectory.csv"),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            walker: WalkerProfile::default(),
            engine: EngineConfig::default(),
            artifacts: ArtifactConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a file, with `ODO_`-prefixed environment
    /// variables taking precedence.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("ODO").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from environment variables only.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("ODO").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(Error::Config("serial port must not be empty".into()));
        }
        if self.serial.baud_rate == 0 {
            return Err(Error::Config("baud rate must be positive".into()));
        }
        if self.serial.read_timeout_ms == 0 {
            return Err(Error::Config("read timeout must be positive".into()));
        }
        if self.engine.window_size == 0 {
            return Err(Error::Config("window size must be at least 1".into()));
        }
        if !(self.engine.dt_s > 0.0) {
            return Err(Error::Config("sampling interval must be positive".into()));
        }
        if !(self.engine.min_step_m > 0.0 && self.engine.max_step_m > self.engine.min_step_m) {
            return Err(Error::Config(
                "step clamp bounds must satisfy 0 < min < max".into(),
            ));
        }
        if !(self.walker.height_cm > 0.0 && self.walker.weight_kg > 0.0) {
            return Err(Error::Config("walker height and weight must be positive".into()));
        }
        Ok(())
    }
}
