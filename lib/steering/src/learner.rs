//! Steering vector learning
//!
//! A dimension's direction is the difference between the centroid of its
//! positive-pole embeddings and the centroid of its negative-pole embeddings,
//! normalized to unit length. Same idea as analogical word-vector arithmetic:
//! the offset between two groups of meanings is itself a meaning.

use serde::Serialize;
use steerx_core::{
    embed_all, kernels, ContrastiveExample, Embedder, Error, PairedEmbeddings, Result, Stage, SteeringConfig,
    SteeringVector, Vector, VectorOrigin,
};
use tracing::{debug, info, warn};

/// Diagnostics recorded while learning one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnReport {
    pub dimension: String,
    pub pairs: usize,
    pub embedding_dim: usize,
    /// Norm of the raw direction before normalization.
    pub magnitude: f64,
    /// Euclidean distance between the two pole centroids.
    pub separation: f64,
    /// Population standard deviation over every coordinate of the positive
    /// embeddings.
    pub positive_spread: f64,
    /// Same, for the negative embeddings.
    pub negative_spread: f64,
    /// `separation` over the mean spread; below ~1 the poles overlap.
    pub separation_ratio: f64,
    /// Set when `magnitude` fell under the configured warning threshold.
    pub weak_separation: bool,
}

/// Output of a full learning run.
#[derive(Debug, Clone)]
pub struct Learned {
    pub vector: SteeringVector,
    pub report: LearnReport,
    /// Embedded examples, reusable by the dimension expander.
    pub embeddings: PairedEmbeddings,
}

/// Learns one steering vector per dimension from contrastive examples.
pub struct VectorLearner<E> {
    embedder: E,
    config: SteeringConfig,
}

impl<E: Embedder> VectorLearner<E> {
    pub fn new(embedder: E, config: SteeringConfig) -> Self {
        Self { embedder, config }
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Learn `dimension` from `examples`.
    pub fn learn(&self, dimension: &str, examples: &[ContrastiveExample]) -> Result<SteeringVector> {
        self.learn_with_report(dimension, examples).map(|learned| learned.vector)
    }

    /// Learn `dimension` and keep the diagnostics and embeddings.
    pub fn learn_with_report(&self, dimension: &str, examples: &[ContrastiveExample]) -> Result<Learned> {
        self.check_count(dimension, examples.len())?;
        let embeddings = self.embed_examples(dimension, examples)?;
        let (vector, report) = self.learn_from_embeddings(dimension, &embeddings)?;
        Ok(Learned {
            vector,
            report,
            embeddings,
        })
    }

    /// Embed every positive and negative text, keeping pairs index-aligned.
    ///
    /// All texts are embedded in one parallel batch and joined before return.
    pub fn embed_examples(&self, dimension: &str, examples: &[ContrastiveExample]) -> Result<PairedEmbeddings> {
        if examples.is_empty() {
            return Err(Error::InsufficientData {
                stage: Stage::Learn,
                dimension: dimension.to_string(),
                required: self.config.min_examples,
                actual: 0,
            });
        }

        let texts: Vec<&str> = examples
            .iter()
            .map(|e| e.positive_text.as_str())
            .chain(examples.iter().map(|e| e.negative_text.as_str()))
            .collect();

        debug!(dimension, texts = texts.len(), "embedding contrastive examples");
        let mut embedded = embed_all(&self.embedder, &texts, Stage::Learn, dimension)?;
        let negatives = embedded.split_off(examples.len());
        PairedEmbeddings::new(dimension, embedded, negatives)
    }

    /// Learn from already-embedded pairs.
    pub fn learn_from_embeddings(
        &self,
        dimension: &str,
        embeddings: &PairedEmbeddings,
    ) -> Result<(SteeringVector, LearnReport)> {
        self.check_count(dimension, embeddings.len())?;

        let dim = embeddings.dim();
        let positive_centroid = kernels::centroid(embeddings.positives().iter().map(Vector::as_slice), dim);
        let negative_centroid = kernels::centroid(embeddings.negatives().iter().map(Vector::as_slice), dim);

        let raw: Vec<f64> = positive_centroid
            .iter()
            .zip(&negative_centroid)
            .map(|(p, n)| p - n)
            .collect();

        let vector = SteeringVector::from_raw(
            dimension,
            &raw,
            self.config.degenerate_epsilon,
            Stage::Learn,
            VectorOrigin::Learned,
            None,
        )?;

        let positive_spread = spread(embeddings.positives());
        let negative_spread = spread(embeddings.negatives());
        let mean_spread = (positive_spread + negative_spread) / 2.0;
        let magnitude = vector.magnitude();
        let separation = kernels::norm_f64(&raw);
        let weak_separation = magnitude < self.config.weak_separation_warning;

        let report = LearnReport {
            dimension: dimension.to_string(),
            pairs: embeddings.len(),
            embedding_dim: dim,
            magnitude,
            separation,
            positive_spread,
            negative_spread,
            separation_ratio: if mean_spread > f64::EPSILON {
                separation / mean_spread
            } else {
                f64::INFINITY
            },
            weak_separation,
        };

        if weak_separation {
            warn!(
                dimension,
                magnitude,
                threshold = self.config.weak_separation_warning,
                "poles are weakly separated; steering along this dimension will be noisy"
            );
        }
        info!(
            dimension,
            pairs = report.pairs,
            magnitude,
            separation_ratio = report.separation_ratio,
            "learned steering vector"
        );

        Ok((vector, report))
    }

    fn check_count(&self, dimension: &str, actual: usize) -> Result<()> {
        let required = self.config.min_examples.max(2);
        if actual < required {
            return Err(Error::InsufficientData {
                stage: Stage::Learn,
                dimension: dimension.to_string(),
                required,
                actual,
            });
        }
        Ok(())
    }
}

/// Population standard deviation over every coordinate of `rows`.
fn spread(rows: &[Vector]) -> f64 {
    let count = rows.iter().map(Vector::dim).sum::<usize>();
    if count == 0 {
        return 0.0;
    }
    let values = || rows.iter().flat_map(|row| row.as_slice().iter().map(|&x| x as f64));
    let mean = values().sum::<f64>() / count as f64;
    let variance = values().map(|x| (x - mean) * (x - mean)).sum::<f64>() / count as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use steerx_core::{HashingEmbedder, UNIT_NORM_TOLERANCE};

    /// Two-axis embedder: "good" words push +x, "bad" words push +y.
    struct PoleEmbedder;

    impl Embedder for PoleEmbedder {
        fn dimension(&self) -> usize {
            3
        }

        fn embed(&self, text: &str) -> Result<Vector> {
            let good = text.matches("good").count() as f32;
            let bad = text.matches("bad").count() as f32;
            Ok(Vector::new(vec![good, bad, 1.0]))
        }
    }

    fn examples(n: usize) -> Vec<ContrastiveExample> {
        (0..n)
            .map(|i| ContrastiveExample::new(format!("good {i}"), format!("bad {i}")))
            .collect()
    }

    #[test]
    fn test_direction_points_from_negative_to_positive() {
        let learner = VectorLearner::new(PoleEmbedder, SteeringConfig::default());
        let v = learner.learn("quality", &examples(4)).unwrap();

        let d = v.direction().as_slice();
        assert!(d[0] > 0.7 && d[1] < -0.7);
        assert!(d[2].abs() < 1e-6);
        assert!(v.direction().is_unit(UNIT_NORM_TOLERANCE));
        assert!((v.magnitude() - 2f64.sqrt()).abs() < 1e-9);
        assert_eq!(v.variance_explained(), None);
    }

    #[test]
    fn test_single_example_is_insufficient() {
        let learner = VectorLearner::new(PoleEmbedder, SteeringConfig::default());
        let err = learner.learn("quality", &examples(1)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData { stage: Stage::Learn, required: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_configured_minimum_is_enforced() {
        let config = SteeringConfig {
            min_examples: 5,
            ..Default::default()
        };
        let learner = VectorLearner::new(PoleEmbedder, config);
        assert!(learner.learn("quality", &examples(4)).is_err());
        assert!(learner.learn("quality", &examples(5)).is_ok());
    }

    #[test]
    fn test_identical_poles_are_degenerate() {
        let learner = VectorLearner::new(PoleEmbedder, SteeringConfig::default());
        let same = vec![
            ContrastiveExample::new("neutral one", "neutral two"),
            ContrastiveExample::new("neutral three", "neutral four"),
        ];
        let err = learner.learn("quality", &same).unwrap_err();
        assert!(matches!(err, Error::DegenerateVector { stage: Stage::Learn, .. }));
    }

    #[test]
    fn test_learning_is_deterministic() {
        let learner = VectorLearner::new(HashingEmbedder::new(64).unwrap(), SteeringConfig::default());
        let pairs = vec![
            ContrastiveExample::new("I adore working with them", "I despise working with them"),
            ContrastiveExample::new("I cherish their feedback", "I resent their feedback"),
            ContrastiveExample::new("their presence is a gift", "their presence is a burden"),
        ];
        let a = learner.learn("love", &pairs).unwrap();
        let b = learner.learn("love", &pairs).unwrap();
        assert_eq!(a, b);
        assert!(a.direction().is_unit(UNIT_NORM_TOLERANCE));
    }

    #[test]
    fn test_report_and_embeddings_are_kept() {
        let learner = VectorLearner::new(PoleEmbedder, SteeringConfig::default());
        let learned = learner.learn_with_report("quality", &examples(3)).unwrap();
        assert_eq!(learned.report.pairs, 3);
        assert_eq!(learned.report.embedding_dim, 3);
        assert_eq!(learned.embeddings.len(), 3);
        assert!(!learned.report.weak_separation);
        // every positive embeds to [1, 0, 1]
        assert!((learned.report.positive_spread - (2.0f64 / 9.0).sqrt()).abs() < 1e-9);
        assert!((learned.report.separation - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_report_statistics_by_hand() {
        let learner = VectorLearner::new(PoleEmbedder, SteeringConfig::default());
        let embeddings = PairedEmbeddings::new(
            "quality",
            vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![3.0, 0.0])],
            vec![Vector::new(vec![0.0, 1.0]), Vector::new(vec![0.0, 1.0])],
        )
        .unwrap();
        let (_, report) = learner.learn_from_embeddings("quality", &embeddings).unwrap();

        // positives {1, 0, 3, 0}: mean 1, variance 1.5; negatives {0, 1, 0, 1}: variance 0.25
        assert!((report.positive_spread - 1.5f64.sqrt()).abs() < 1e-9);
        assert!((report.negative_spread - 0.5).abs() < 1e-9);
        // centroids [2, 0] and [0, 1]
        assert!((report.separation - 5f64.sqrt()).abs() < 1e-9);
        assert!((report.magnitude - report.separation).abs() < 1e-6);
        let mean_spread = (1.5f64.sqrt() + 0.5) / 2.0;
        assert!((report.separation_ratio - 5f64.sqrt() / mean_spread).abs() < 1e-9);
    }
}
