//! Step-length estimator boundary.
//!
//! The live engine consumes the trained regression model through this trait
//! only; the concrete network lives in `odo-model`. The window handed in is
//! already standardized by the session's [`StandardScaler`].
//!
//! [`StandardScaler`]: crate::scaler::StandardScaler

use crate::error::Result;
use crate::types::FeatureVector;

/// Maps a complete, scaled observation window to one step length in meters.
pub trait StepLengthEstimator {
    fn estimate(&self, window: &[FeatureVector]) -> Result<f64>;
}
