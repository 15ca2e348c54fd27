//! Fundamental types for the odo PDR system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one walking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Walker sex, encoded the way the regression model was trained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Numeric code fed to the estimator (male = 0, female = 1)
    pub fn code(&self) -> f32 {
        match self {
            Sex::Male => 0.0,
            Sex::Female => 1.0,
        }
    }
}

/// Per-session walker constants carried into every feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkerProfile {
    /// Height in centimeters
    pub height_cm: f32,
    /// Weight in kilograms
    pub weight_kg: f32,
    pub sex: Sex,
}

impl Default for WalkerProfile {
    fn default() -> Self {
        Self {
            height_cm: 175.0,
            weight_kg: 70.0,
            sex: Sex::Male,
        }
    }
}

/// One parsed sensor sample
///
/// Produced once per valid input line and never mutated. Angular rates are
/// in degrees per second, accelerations in the sensor's native units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Monotonic hardware step counter (fractional on some firmwares)
    pub raw_step: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    /// Yaw reported by the IMU's own fusion; carried but unused by the engine
    pub imu_yaw: f64,
}

/// Ordered feature tuple submitted to the step-length estimator
///
/// Layout is fixed by the trained model:
/// `(gx, gy, gz, ax, ay, az, height_cm, weight_kg, sex_code, sin h, cos h)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f32; FeatureVector::DIM]);

impl FeatureVector {
    /// Number of features per sample
    pub const DIM: usize = 11;

    /// Build the feature tuple from a frame, the session's walker constants
    /// and the current integrated heading (radians).
    pub fn from_frame(frame: &SensorFrame, profile: &WalkerProfile, heading_rad: f64) -> Self {
        let (sin_h, cos_h) = heading_rad.sin_cos();
        Self([
            frame.gx as f32,
            frame.gy as f32,
            frame.gz as f32,
            frame.ax as f32,
            frame.ay as f32,
            frame.az as f32,
            profile.height_cm,
            profile.weight_kg,
            profile.sex.code(),
            sin_h as f32,
            cos_h as f32,
        ])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// 2D position in the session's local frame (meters, origin at start)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One successfully estimated step; immutable once created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based ordinal of the step within the session
    pub step_index: u32,
    /// Clamped estimator output in meters
    pub step_length_m: f64,
    pub x_m: f64,
    pub y_m: f64,
    pub heading_deg: f64,
}
