use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for learning, composition and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Fewest contrastive examples a dimension can be learned from (>= 2).
    pub min_examples: usize,
    /// Centroid separation below which a learned vector is rejected.
    pub degenerate_epsilon: f64,
    /// Centroid separation below which learning succeeds with a warning.
    pub weak_separation_warning: f64,
    /// Composition strength used when the caller does not pass one.
    pub default_strength: f32,
    /// Similarity mass below which alignment falls back to 0.5.
    pub zero_similarity_epsilon: f64,
    /// Explained-variance ratio below which expanded components are dropped.
    pub min_variance_ratio: f64,
    /// Width of the built-in hashing embedder.
    pub hashing_dim: usize,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            min_examples: 2,
            degenerate_epsilon: 1e-6,
            weak_separation_warning: 0.05,
            default_strength: 1.0,
            zero_similarity_epsilon: 1e-6,
            min_variance_ratio: 1e-6,
            hashing_dim: crate::embedder::DEFAULT_HASHING_DIM,
        }
    }
}

impl SteeringConfig {
    /// Load a JSON config file; missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: SteeringConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_examples < 2 {
            return Err(Error::InvalidConfig(format!(
                "min_examples must be at least 2, got {}",
                self.min_examples
            )));
        }
        if !(self.degenerate_epsilon.is_finite() && self.degenerate_epsilon >= 0.0) {
            return Err(Error::InvalidConfig("degenerate_epsilon must be finite and >= 0".to_string()));
        }
        if !self.default_strength.is_finite() {
            return Err(Error::InvalidConfig("default_strength must be finite".to_string()));
        }
        if !(self.zero_similarity_epsilon.is_finite() && self.zero_similarity_epsilon >= 0.0) {
            return Err(Error::InvalidConfig(
                "zero_similarity_epsilon must be finite and >= 0".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.min_variance_ratio) {
            return Err(Error::InvalidConfig("min_variance_ratio must be within [0, 1)".to_string()));
        }
        if self.hashing_dim == 0 {
            return Err(Error::InvalidConfig("hashing_dim must be > 0".to_string()));
        }
        Ok(())
    }
}
