use crate::{kernels, Error, Result, Stage, Vector};
use serde::{Deserialize, Serialize};

/// Tolerance for the unit-norm invariant on steering directions.
pub const UNIT_NORM_TOLERANCE: f64 = 1e-6;

/// How a steering vector came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorOrigin {
    /// Centroid difference of labeled contrastive pairs.
    Learned,
    /// Principal component `component` (1-based) of the primary dimension's
    /// pair differences.
    Expanded { component: usize },
}

/// A unit direction in embedding space for one named dimension.
///
/// Immutable once built; retraining replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteeringVector {
    dimension: String,
    direction: Vector,
    magnitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variance_explained: Option<f32>,
    origin: VectorOrigin,
}

impl SteeringVector {
    /// Normalize a raw direction into a steering vector.
    ///
    /// `magnitude` is the pre-normalization norm of `raw`. Fails with
    /// `DegenerateVector` when it is below `epsilon`.
    pub fn from_raw(
        dimension: impl Into<String>,
        raw: &[f64],
        epsilon: f64,
        stage: Stage,
        origin: VectorOrigin,
        variance_explained: Option<f32>,
    ) -> Result<Self> {
        let dimension = dimension.into();
        let magnitude = kernels::norm_f64(raw);

        if !magnitude.is_finite() || magnitude < epsilon {
            return Err(Error::DegenerateVector {
                stage,
                dimension,
                magnitude,
                epsilon,
            });
        }

        let inv = 1.0 / magnitude;
        let direction = Vector::new(raw.iter().map(|x| (x * inv) as f32).collect());

        Ok(Self {
            dimension,
            direction,
            magnitude,
            variance_explained,
            origin,
        })
    }

    #[inline]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    #[inline]
    pub fn direction(&self) -> &Vector {
        &self.direction
    }

    /// Embedding width of the direction.
    #[inline]
    pub fn len(&self) -> usize {
        self.direction.dim()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.direction.is_empty()
    }

    /// Norm of the direction before normalization. Low values mean the two
    /// poles were barely separated in embedding space.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    #[inline]
    pub fn variance_explained(&self) -> Option<f32> {
        self.variance_explained
    }

    #[inline]
    pub fn origin(&self) -> VectorOrigin {
        self.origin
    }

    /// Same direction under a different dimension name.
    pub fn relabel(&self, dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            ..self.clone()
        }
    }

    /// Re-check invariants on a value read back from storage.
    pub fn validate(&self) -> Result<()> {
        if self.dimension.is_empty() {
            return Err(Error::Storage("steering vector has an empty dimension name".to_string()));
        }
        if !self.direction.is_unit(UNIT_NORM_TOLERANCE * 10.0) {
            return Err(Error::Storage(format!(
                "steering vector `{}` is not unit norm (norm = {})",
                self.dimension,
                self.direction.norm()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_normalizes() {
        let v = SteeringVector::from_raw("love", &[3.0, 4.0], 1e-6, Stage::Learn, VectorOrigin::Learned, None)
            .unwrap();
        assert!(v.direction().is_unit(UNIT_NORM_TOLERANCE));
        assert!((v.magnitude() - 5.0).abs() < 1e-12);
        assert_eq!(v.variance_explained(), None);
        assert!(v.validate().is_ok());
    }

    #[test]
    fn test_from_raw_rejects_degenerate() {
        let err = SteeringVector::from_raw("love", &[0.0, 1e-9], 1e-6, Stage::Learn, VectorOrigin::Learned, None)
            .unwrap_err();
        match err {
            Error::DegenerateVector { dimension, magnitude, .. } => {
                assert_eq!(dimension, "love");
                assert!(magnitude < 1e-6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_serde_roundtrip_keeps_bits() {
        let v = SteeringVector::from_raw(
            "trust",
            &[0.123456789, -0.987654321, 0.5],
            1e-6,
            Stage::Expand,
            VectorOrigin::Expanded { component: 3 },
            Some(0.25),
        )
        .unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: SteeringVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
