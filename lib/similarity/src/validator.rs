//! Semantic dial validation
//!
//! Checks generated text against the dials that were meant to shape it, by
//! comparing the text's embedding with embeddings of each dimension's pole
//! descriptors.

use crate::alignment::{alignment, expected_similarity};
use crate::descriptor::{DescriptorIndex, DescriptorSet};
use crate::report::{Selection, ValidationReport, ValidationResult};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use steerx_core::{
    embed_all, embed_checked, kernels, DialLevel, DialSetting, Embedder, Error, Result, Stage, SteeringConfig,
    Vector,
};
use tracing::debug;

pub struct SemanticValidator<E> {
    embedder: E,
    descriptors: DescriptorSet,
    index: DescriptorIndex,
    config: SteeringConfig,
}

impl<E: Embedder> SemanticValidator<E> {
    /// Embed every descriptor once and keep the result.
    pub fn new(embedder: E, descriptors: DescriptorSet, config: SteeringConfig) -> Result<Self> {
        let index = DescriptorIndex::build(&embedder, &descriptors)?;
        Ok(Self {
            embedder,
            descriptors,
            index,
            config,
        })
    }

    pub fn descriptors(&self) -> &DescriptorSet {
        &self.descriptors
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Score one candidate against every dial.
    pub fn validate(&self, dials: &DialSetting, candidate: &str) -> Result<ValidationReport> {
        self.check_descriptors(dials, Stage::Validate)?;
        let embedding = embed_checked(&self.embedder, candidate, Stage::Validate, "candidate")?;
        self.score(dials, &embedding, Stage::Validate)
    }

    /// Score an already-embedded candidate.
    pub fn validate_embedding(&self, dials: &DialSetting, embedding: &Vector) -> Result<ValidationReport> {
        self.check_descriptors(dials, Stage::Validate)?;
        self.score(dials, embedding, Stage::Validate)
    }

    /// Pick the candidate closest to the dial target.
    ///
    /// The target is `sum(v * high + (1 - v) * low)` over all dials,
    /// normalized. Ties go to the earliest candidate. With no usable target
    /// (no dials, or poles that cancel out) every score is 0 and the first
    /// candidate wins.
    pub fn select_best<S>(&self, dials: &DialSetting, candidates: &[S]) -> Result<Selection>
    where
        S: AsRef<str> + Sync,
    {
        if candidates.is_empty() {
            return Err(Error::EmptyCandidateSet { stage: Stage::Select });
        }
        self.check_descriptors(dials, Stage::Select)?;

        let target = self.target(dials)?;
        let embeddings = embed_all(&self.embedder, candidates, Stage::Select, "candidate")?;

        let scores: Vec<f32> = match &target {
            Some(target) => embeddings.iter().map(|e| e.cosine_similarity(target)).collect(),
            None => vec![0.0; candidates.len()],
        };

        let mut ranking: Vec<usize> = (0..candidates.len()).collect();
        ranking.sort_by_key(|&i| (Reverse(OrderedFloat(scores[i])), i));
        let index = ranking[0];

        debug!(
            candidates = candidates.len(),
            index,
            score = scores[index],
            "selected best candidate"
        );

        let report = self.score(dials, &embeddings[index], Stage::Select)?;
        Ok(Selection {
            text: candidates[index].as_ref().to_string(),
            index,
            overall_similarity: scores[index],
            scores,
            ranking,
            candidates_tested: candidates.len(),
            report,
        })
    }

    /// Validate one response per source (model name, prompt variant, ...).
    /// Results are not ranked.
    pub fn compare(
        &self,
        dials: &DialSetting,
        responses: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, ValidationReport>> {
        self.check_descriptors(dials, Stage::Compare)?;

        let sources: Vec<&String> = responses.keys().collect();
        let texts: Vec<&str> = responses.values().map(String::as_str).collect();
        let embeddings = embed_all(&self.embedder, &texts, Stage::Compare, "response")?;

        sources
            .into_iter()
            .zip(&embeddings)
            .map(|(source, embedding)| Ok((source.clone(), self.score(dials, embedding, Stage::Compare)?)))
            .collect()
    }

    fn check_descriptors(&self, dials: &DialSetting, stage: Stage) -> Result<()> {
        for dimension in dials.dimensions() {
            self.index.poles(dimension, stage)?;
        }
        Ok(())
    }

    fn score(&self, dials: &DialSetting, embedding: &Vector, stage: Stage) -> Result<ValidationReport> {
        if embedding.dim() != self.index.dim() {
            return Err(Error::DimensionMismatch {
                stage,
                dimension: "candidate".to_string(),
                expected: self.index.dim(),
                actual: embedding.dim(),
            });
        }

        let mut results = Vec::with_capacity(dials.len());
        for (dimension, dial_value) in dials.iter() {
            let poles = self.index.poles(dimension, stage)?;
            let low_similarity = embedding.cosine_similarity(&poles.low);
            let high_similarity = embedding.cosine_similarity(&poles.high);

            results.push(ValidationResult {
                dimension: dimension.to_string(),
                dial_value,
                level: DialLevel::of(dial_value),
                low_similarity,
                high_similarity,
                expected_similarity: expected_similarity(dial_value, low_similarity, high_similarity),
                alignment: alignment(
                    dial_value,
                    low_similarity,
                    high_similarity,
                    self.config.zero_similarity_epsilon,
                ),
            });
        }
        Ok(ValidationReport { results })
    }

    /// Normalized dial target, `None` when it has ~0 norm.
    fn target(&self, dials: &DialSetting) -> Result<Option<Vector>> {
        let mut acc = vec![0.0f64; self.index.dim()];
        for (dimension, value) in dials.iter() {
            let poles = self.index.poles(dimension, Stage::Select)?;
            kernels::axpy(&mut acc, value as f64, poles.high.as_slice());
            kernels::axpy(&mut acc, 1.0 - value as f64, poles.low.as_slice());
        }

        let norm = kernels::norm_f64(&acc);
        if norm < self.config.degenerate_epsilon || norm == 0.0 {
            return Ok(None);
        }
        Ok(Some(Vector::new(acc.iter().map(|x| (x / norm) as f32).collect())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steerx_core::HashingEmbedder;

    fn validator() -> SemanticValidator<HashingEmbedder> {
        let descriptors = DescriptorSet::new()
            .with("love", "I resent this", "I deeply cherish this")
            .unwrap();
        SemanticValidator::new(HashingEmbedder::new(128).unwrap(), descriptors, SteeringConfig::default()).unwrap()
    }

    #[test]
    fn test_candidate_equal_to_high_pole() {
        let validator = validator();
        let high = DialSetting::from_pairs([("love", 1.0)]).unwrap();
        let low = DialSetting::from_pairs([("love", 0.0)]).unwrap();

        let a_high = validator.validate(&high, "I deeply cherish this").unwrap();
        let a_low = validator.validate(&low, "I deeply cherish this").unwrap();

        let r = a_high.get("love").unwrap();
        assert!((r.high_similarity - 1.0).abs() < 1e-5);
        assert_eq!(r.level, DialLevel::VeryHigh);
        assert!(a_high.alignment("love").unwrap() > a_low.alignment("love").unwrap());
    }

    #[test]
    fn test_missing_descriptor() {
        let validator = validator();
        let dials = DialSetting::from_pairs([("irony", 0.3)]).unwrap();
        assert!(matches!(
            validator.validate(&dials, "text"),
            Err(Error::MissingDescriptor { stage: Stage::Validate, .. })
        ));
        assert!(matches!(
            validator.select_best(&dials, &["a"]),
            Err(Error::MissingDescriptor { stage: Stage::Select, .. })
        ));
    }

    #[test]
    fn test_empty_candidates() {
        let validator = validator();
        let dials = DialSetting::from_pairs([("love", 1.0)]).unwrap();
        let none: [&str; 0] = [];
        assert!(matches!(
            validator.select_best(&dials, &none),
            Err(Error::EmptyCandidateSet { stage: Stage::Select })
        ));
    }

    #[test]
    fn test_no_dials_picks_first() {
        let validator = validator();
        let selection = validator
            .select_best(&DialSetting::new(), &["first", "second", "third"])
            .unwrap();
        assert_eq!(selection.index, 0);
        assert_eq!(selection.scores, vec![0.0, 0.0, 0.0]);
        assert_eq!(selection.ranking, vec![0, 1, 2]);
        assert!(selection.report.is_empty());
    }

    #[test]
    fn test_ties_go_to_earliest() {
        let validator = validator();
        let dials = DialSetting::from_pairs([("love", 1.0)]).unwrap();
        let selection = validator
            .select_best(&dials, &["something else", "I deeply cherish this", "I deeply cherish this"])
            .unwrap();
        assert_eq!(selection.index, 1);
        assert_eq!(selection.candidates_tested, 3);
        assert_eq!(selection.text, "I deeply cherish this");
    }

    #[test]
    fn test_compare_keeps_every_source() {
        let validator = validator();
        let dials = DialSetting::from_pairs([("love", 0.8)]).unwrap();
        let responses = BTreeMap::from([
            ("model-a".to_string(), "I deeply cherish this".to_string()),
            ("model-b".to_string(), "I resent this".to_string()),
        ]);
        let results = validator.compare(&dials, &responses).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results["model-a"].alignment("love").unwrap() > results["model-b"].alignment("love").unwrap());
    }
}
