//! Frozen standardization transform applied before classification

use anyhow::{bail, Result};
use serde::Deserialize;

/// Fitted standard scaler parameters, frozen at training time.
///
/// Loaded from the scaler artifact and applied elementwise as
/// `(x - mean) / scale` to every aligned feature vector.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Create a scaler from fitted parameters
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Identity scaler over `len` columns (mean 0, scale 1)
    pub fn identity(len: usize) -> Self {
        Self {
            mean: vec![0.0; len],
            scale: vec![1.0; len],
        }
    }

    /// Number of feature columns the scaler was fitted on
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Apply the frozen affine transform to an aligned feature vector.
    ///
    /// A length mismatch means the loaded artifacts disagree about the
    /// feature schema; it is reported as an error, never coerced.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if self.mean.len() != self.scale.len() {
            bail!(
                "scaler parameters are inconsistent: {} mean values, {} scale values",
                self.mean.len(),
                self.scale.len()
            );
        }
        if features.len() != self.mean.len() {
            bail!(
                "feature vector has {} columns but the scaler was fitted on {}",
                features.len(),
                self.mean.len()
            );
        }

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_applies_affine() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 4.0]);
        let scaled = scaler.transform(&[14.0, 8.0]).unwrap();
        assert_eq!(scaled, vec![2.0, 2.0]);
    }

    #[test]
    fn test_identity_scaler_passes_through() {
        let scaler = StandardScaler::identity(3);
        let scaled = scaler.transform(&[1.0, -2.5, 0.0]).unwrap();
        assert_eq!(scaled, vec![1.0, -2.5, 0.0]);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let scaler = StandardScaler::identity(4);
        assert!(scaler.transform(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_inconsistent_parameters_are_an_error() {
        let scaler = StandardScaler::new(vec![0.0, 0.0], vec![1.0]);
        assert!(scaler.transform(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_deserialize_from_artifact_json() {
        let json = r#"{"mean": [178099.5, 35.4], "scale": [129747.6, 9.2]}"#;
        let scaler: StandardScaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler.len(), 2);
        assert_eq!(scaler.mean[0], 178099.5);
        assert_eq!(scaler.scale[1], 9.2);
    }
}
