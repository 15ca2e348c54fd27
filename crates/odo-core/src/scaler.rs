//! Pre-fit feature scaler applied to observation windows before estimation.
//!
//! The scaler is fit offline together with the regression model and shipped
//! as a JSON artifact holding one mean and one scale per feature. The engine
//! loads it once at session start and treats it as an opaque transform; no
//! fitting happens here.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::FeatureVector;

/// Per-feature standardization transform: `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl StandardScaler {
    /// Build a scaler from explicit parameters, validating dimensions.
    pub fn new(mean: Vec<f32>, scale: Vec<f32>) -> Result<Self> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Identity transform (zero mean, unit scale); used in tests.
    pub fn identity() -> Self {
        Self {
            mean: vec![0.0; FeatureVector::DIM],
            scale: vec![1.0; FeatureVector::DIM],
        }
    }

    /// Load and validate the JSON artifact produced by the training pipeline.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::Artifact(format!("cannot open scaler {}: {e}", path.as_ref().display()))
        })?;
        let scaler: Self = serde_json::from_reader(BufReader::new(file))?;
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if self.mean.len() != FeatureVector::DIM || self.scale.len() != FeatureVector::DIM {
            return Err(Error::Artifact(format!(
                "scaler dimensions {}x{} do not match the {}-feature layout",
                self.mean.len(),
                self.scale.len(),
                FeatureVector::DIM
            )));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(Error::Artifact("scaler contains a zero or non-finite scale".into()));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(Error::Artifact("scaler contains a non-finite mean".into()));
        }
        Ok(())
    }

    /// Standardize every vector of a window. Infallible: dimensions were
    /// checked at construction and `FeatureVector` is fixed-size.
    pub fn transform(&self, window: &[FeatureVector]) -> Vec<FeatureVector> {
        window
            .iter()
            .map(|fv| {
                let mut scaled = [0.0f32; FeatureVector::DIM];
                for (i, value) in fv.as_slice().iter().enumerate() {
                    scaled[i] = (value - self.mean[i]) / self.scale[i];
                }
                FeatureVector(scaled)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform_is_noop() {
        let scaler = StandardScaler::identity();
        let fv = FeatureVector([2.0; FeatureVector::DIM]);
        let out = scaler.transform(&[fv]);
        assert_eq!(out, vec![fv]);
    }

    #[test]
    fn test_transform_applies_mean_and_scale() {
        let scaler = StandardScaler::new(
            vec![1.0; FeatureVector::DIM],
            vec![2.0; FeatureVector::DIM],
        )
        .unwrap();
        let fv = FeatureVector([5.0; FeatureVector::DIM]);
        let out = scaler.transform(&[fv]);
        assert_eq!(out[0], FeatureVector([2.0; FeatureVector::DIM]));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let err = StandardScaler::new(vec![0.0; 4], vec![1.0; 4]).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut scale = vec![1.0; FeatureVector::DIM];
        scale[3] = 0.0;
        let err = StandardScaler::new(vec![0.0; FeatureVector::DIM], scale).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let scaler = StandardScaler::identity();
        let json = serde_json::to_string(&scaler).unwrap();
        let parsed: StandardScaler = serde_json::from_str(&json).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
