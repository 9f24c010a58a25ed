//! Steering composition
//!
//! Each dial contributes `(value - 0.5) * 2 * strength` times its dimension's
//! direction. The summed offset is added to the base embedding and the result
//! is rescaled once to the base norm, so steering rotates the embedding rather
//! than inflating it.

use steerx_core::{kernels, DialSetting, Error, Result, Stage, SteeringConfig, Vector, VectorSnapshot, NEUTRAL};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SteeringComposer {
    config: SteeringConfig,
}

impl SteeringComposer {
    pub fn new(config: SteeringConfig) -> Self {
        Self { config }
    }

    /// Compose with the configured default strength.
    pub fn compose_default(&self, base: &Vector, dials: &DialSetting, vectors: &VectorSnapshot) -> Result<Vector> {
        self.compose(base, dials, vectors, self.config.default_strength)
    }

    /// Steer `base` by `dials`, looking directions up in `vectors`.
    pub fn compose(
        &self,
        base: &Vector,
        dials: &DialSetting,
        vectors: &VectorSnapshot,
        strength: f32,
    ) -> Result<Vector> {
        let offset = self.offset(base.dim(), dials, vectors, strength)?;
        if offset.iter().all(|x| *x == 0.0) {
            return Ok(base.clone());
        }

        let base_norm = base.norm();
        if base_norm == 0.0 {
            debug!("zero base embedding; composition leaves it unchanged");
            return Ok(base.clone());
        }

        let mut steered = offset;
        for (s, b) in steered.iter_mut().zip(base.as_slice()) {
            *s += *b as f64;
        }

        let steered_norm = kernels::norm_f64(&steered);
        if !steered_norm.is_finite() || steered_norm < self.config.degenerate_epsilon {
            return Err(Error::DegenerateVector {
                stage: Stage::Compose,
                dimension: dials.dimensions().collect::<Vec<_>>().join(","),
                magnitude: steered_norm,
                epsilon: self.config.degenerate_epsilon,
            });
        }

        let scale = base_norm / steered_norm;
        debug!(dials = dials.len(), strength, scale, "composed steered embedding");
        Ok(Vector::new(steered.iter().map(|x| (x * scale) as f32).collect()))
    }

    /// The bare weighted sum of directions, before it touches any base.
    pub fn adjustment(
        &self,
        embedding_dim: usize,
        dials: &DialSetting,
        vectors: &VectorSnapshot,
        strength: f32,
    ) -> Result<Vector> {
        self.offset(embedding_dim, dials, vectors, strength)
            .map(|offset| Vector::from_f64(&offset))
    }

    fn offset(
        &self,
        embedding_dim: usize,
        dials: &DialSetting,
        vectors: &VectorSnapshot,
        strength: f32,
    ) -> Result<Vec<f64>> {
        if !strength.is_finite() {
            return Err(Error::InvalidConfig(format!("steering strength must be finite, got {strength}")));
        }

        let mut offset = vec![0.0f64; embedding_dim];
        for (dimension, value) in dials.iter() {
            let vector = vectors.get(dimension).ok_or_else(|| Error::UnknownDimension {
                stage: Stage::Compose,
                dimension: dimension.to_string(),
            })?;

            if vector.len() != embedding_dim {
                return Err(Error::DimensionMismatch {
                    stage: Stage::Compose,
                    dimension: dimension.to_string(),
                    expected: embedding_dim,
                    actual: vector.len(),
                });
            }

            let signed = (value as f64 - NEUTRAL as f64) * 2.0 * strength as f64;
            if signed != 0.0 {
                kernels::axpy(&mut offset, signed, vector.direction().as_slice());
            }
        }
        Ok(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steerx_core::{SteeringVector, VectorOrigin};

    fn vector(name: &str, raw: &[f64]) -> SteeringVector {
        SteeringVector::from_raw(name, raw, 1e-6, Stage::Learn, VectorOrigin::Learned, None).unwrap()
    }

    fn snapshot() -> VectorSnapshot {
        VectorSnapshot::from_vectors(
            1,
            vec![vector("love", &[1.0, 0.0, 0.0]), vector("irony", &[0.0, 1.0, 0.0])],
        )
        .unwrap()
    }

    #[test]
    fn test_neutral_dials_are_identity() {
        let composer = SteeringComposer::default();
        let base = Vector::new(vec![0.3, -0.2, 0.9]);
        let dials = DialSetting::from_pairs([("love", 0.5), ("irony", 0.5)]).unwrap();

        assert_eq!(composer.compose(&base, &dials, &snapshot(), 1.0).unwrap(), base);
        assert_eq!(composer.compose(&base, &DialSetting::new(), &snapshot(), 1.0).unwrap(), base);
    }

    #[test]
    fn test_zero_strength_is_identity() {
        let composer = SteeringComposer::default();
        let base = Vector::new(vec![0.3, -0.2, 0.9]);
        let dials = DialSetting::from_pairs([("love", 1.0)]).unwrap();
        assert_eq!(composer.compose(&base, &dials, &snapshot(), 0.0).unwrap(), base);
    }

    #[test]
    fn test_keeps_base_norm_and_moves_toward_pole() {
        let composer = SteeringComposer::default();
        let base = Vector::new(vec![0.0, 0.0, 2.0]);
        let dials = DialSetting::from_pairs([("love", 1.0)]).unwrap();

        let steered = composer.compose(&base, &dials, &snapshot(), 1.0).unwrap();
        assert!((steered.norm() - 2.0).abs() < 1e-5);
        assert!(steered.as_slice()[0] > 0.0);

        let away = composer
            .compose(&base, &DialSetting::from_pairs([("love", 0.0)]).unwrap(), &snapshot(), 1.0)
            .unwrap();
        assert!(away.as_slice()[0] < 0.0);
    }

    #[test]
    fn test_order_independent() {
        let composer = SteeringComposer::default();
        let base = Vector::new(vec![0.1, 0.4, 0.7]);
        let a = DialSetting::from_pairs([("love", 0.9), ("irony", 0.2)]).unwrap();
        let b = DialSetting::from_pairs([("irony", 0.2), ("love", 0.9)]).unwrap();

        assert_eq!(
            composer.compose(&base, &a, &snapshot(), 1.0).unwrap(),
            composer.compose(&base, &b, &snapshot(), 1.0).unwrap()
        );
    }

    #[test]
    fn test_length_mismatch() {
        let composer = SteeringComposer::default();
        let vectors = VectorSnapshot::from_vectors(1, vec![vector("love", &vec![1.0; 300])]).unwrap();
        let base = Vector::new(vec![0.1; 384]);
        let dials = DialSetting::from_pairs([("love", 0.8)]).unwrap();

        let err = composer.compose(&base, &dials, &vectors, 1.0).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch { stage: Stage::Compose, expected: 384, actual: 300, .. }
        ));
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        let composer = SteeringComposer::default();
        let dials = DialSetting::from_pairs([("sarcasm", 0.8)]).unwrap();
        let err = composer
            .compose(&Vector::new(vec![1.0, 0.0, 0.0]), &dials, &snapshot(), 1.0)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDimension { stage: Stage::Compose, .. }));
    }

    #[test]
    fn test_collapse_is_degenerate() {
        let composer = SteeringComposer::default();
        let base = Vector::new(vec![-2.0, 0.0, 0.0]);
        let dials = DialSetting::from_pairs([("love", 1.0)]).unwrap();
        // Strength 1 only reaches -1.0 along x; strength 2 lands on zero.
        assert!(composer.compose(&base, &dials, &snapshot(), 1.0).is_ok());

        let err = composer.compose(&base, &dials, &snapshot(), 2.0).unwrap_err();
        assert!(matches!(err, Error::DegenerateVector { stage: Stage::Compose, .. }));
    }

    #[test]
    fn test_non_finite_strength() {
        let composer = SteeringComposer::default();
        let dials = DialSetting::from_pairs([("love", 1.0)]).unwrap();
        let err = composer
            .compose(&Vector::new(vec![1.0, 0.0, 0.0]), &dials, &snapshot(), f32::NAN)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_adjustment_is_weighted_sum() {
        let composer = SteeringComposer::default();
        let dials = DialSetting::from_pairs([("love", 1.0), ("irony", 0.25)]).unwrap();
        let adj = composer.adjustment(3, &dials, &snapshot(), 1.0).unwrap();
        assert_eq!(adj.as_slice(), &[1.0, -0.5, 0.0]);
    }
}
