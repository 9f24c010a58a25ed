use crate::{Error, Result, Stage, Vector};
use serde::{Deserialize, Serialize};

/// A matched pair expressing the two poles of one semantic dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrastiveExample {
    pub positive_text: String,
    pub negative_text: String,
}

impl ContrastiveExample {
    pub fn new(positive_text: impl Into<String>, negative_text: impl Into<String>) -> Self {
        Self {
            positive_text: positive_text.into(),
            negative_text: negative_text.into(),
        }
    }
}

/// Embedded contrastive examples; `positives[i]` pairs with `negatives[i]`.
///
/// Built once per dimension and shared between the learner and the expander
/// so each text is embedded a single time.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedEmbeddings {
    positives: Vec<Vector>,
    negatives: Vec<Vector>,
    dim: usize,
}

impl PairedEmbeddings {
    /// Pair up embeddings, checking that both sides have the same count and
    /// that every vector shares one length.
    pub fn new(dimension: &str, positives: Vec<Vector>, negatives: Vec<Vector>) -> Result<Self> {
        if positives.len() != negatives.len() {
            return Err(Error::InsufficientData {
                stage: Stage::Learn,
                dimension: dimension.to_string(),
                required: positives.len().max(negatives.len()),
                actual: positives.len().min(negatives.len()),
            });
        }

        let dim = positives.first().map(Vector::dim).unwrap_or(0);
        for v in positives.iter().chain(negatives.iter()) {
            if v.dim() != dim {
                return Err(Error::DimensionMismatch {
                    stage: Stage::Learn,
                    dimension: dimension.to_string(),
                    expected: dim,
                    actual: v.dim(),
                });
            }
        }

        Ok(Self {
            positives,
            negatives,
            dim,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positives.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positives.is_empty()
    }

    /// Embedding width shared by every vector (0 when empty).
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn positives(&self) -> &[Vector] {
        &self.positives
    }

    #[inline]
    pub fn negatives(&self) -> &[Vector] {
        &self.negatives
    }

    /// Iterate over `(positive, negative)` pairs in example order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Vector, &Vector)> {
        self.positives.iter().zip(self.negatives.iter())
    }

    /// Per-pair difference vectors `positive_i - negative_i`, in f64.
    pub fn differences(&self) -> Vec<Vec<f64>> {
        self.pairs()
            .map(|(p, n)| {
                p.as_slice()
                    .iter()
                    .zip(n.as_slice())
                    .map(|(a, b)| *a as f64 - *b as f64)
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_keep_index_alignment() {
        let pairs = PairedEmbeddings::new(
            "love",
            vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![2.0, 0.0])],
            vec![Vector::new(vec![0.0, 1.0]), Vector::new(vec![0.0, 3.0])],
        )
        .unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.dim(), 2);
        assert_eq!(pairs.differences(), vec![vec![1.0, -1.0], vec![2.0, -3.0]]);
    }

    #[test]
    fn test_rejects_ragged_embeddings() {
        let err = PairedEmbeddings::new(
            "love",
            vec![Vector::new(vec![1.0, 0.0])],
            vec![Vector::new(vec![0.0, 1.0, 0.0])],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3, .. }));
    }

    #[test]
    fn test_rejects_unbalanced_sides() {
        let err = PairedEmbeddings::new("love", vec![Vector::new(vec![1.0])], vec![]).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }
}
