use serde::Serialize;
use steerx_core::DialLevel;

/// How one candidate scored against one dial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub dimension: String,
    pub dial_value: f32,
    pub level: DialLevel,
    pub low_similarity: f32,
    pub high_similarity: f32,
    /// Dial-weighted mix of the two similarities.
    pub expected_similarity: f32,
    pub alignment: f32,
}

/// Per-dimension results for one candidate, ordered by dimension name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn get(&self, dimension: &str) -> Option<&ValidationResult> {
        self.results.iter().find(|r| r.dimension == dimension)
    }

    pub fn alignment(&self, dimension: &str) -> Option<f32> {
        self.get(dimension).map(|r| r.alignment)
    }

    /// Mean alignment over all dimensions, `None` when there are none.
    pub fn mean_alignment(&self) -> Option<f32> {
        if self.results.is_empty() {
            return None;
        }
        let sum: f64 = self.results.iter().map(|r| r.alignment as f64).sum();
        Some((sum / self.results.len() as f64) as f32)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Winner of a best-candidate selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub text: String,
    pub index: usize,
    /// Cosine between the winner and the dial target.
    pub overall_similarity: f32,
    /// Cosine to the target for every candidate, in input order.
    pub scores: Vec<f32>,
    /// Candidate indices, best first.
    pub ranking: Vec<usize>,
    pub candidates_tested: usize,
    /// Validation of the winner against every dial.
    pub report: ValidationReport,
}
