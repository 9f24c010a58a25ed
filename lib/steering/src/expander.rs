//! Dimension expansion
//!
//! When only one dimension has labeled pairs, extra directions can be read off
//! the variation of the per-pair differences `positive_i - negative_i`.
//! Principal components come from whichever of the `n x n` Gram matrix of
//! the centred differences or their `d x d` scatter matrix is smaller. Both
//! share their non-zero eigenvalues; Gram eigenvectors are mapped back into
//! embedding space. Component 1 is the primary axis again and
//! is skipped; components 2..=k+1 become candidate dimensions. They carry no
//! pole texts of their own, so the caller names them.

use crate::eigen::symmetric_eigen;
use serde::Serialize;
use std::collections::BTreeSet;
use steerx_core::{
    kernels, Error, PairedEmbeddings, Result, Stage, SteeringConfig, SteeringVector, Vector, VectorOrigin,
};
use tracing::{debug, info};

/// An unnamed principal direction of the pair differences.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalDirection {
    component: usize,
    raw: Vec<f64>,
    direction: Vector,
    variance_explained: f32,
}

impl PrincipalDirection {
    /// 1-based component index (2 is the first expanded direction).
    pub fn component(&self) -> usize {
        self.component
    }

    /// Unit-length direction.
    pub fn direction(&self) -> &Vector {
        &self.direction
    }

    /// Share of the total difference variance along this component.
    pub fn variance_explained(&self) -> f32 {
        self.variance_explained
    }

    /// Name the direction, turning it into a steering vector.
    pub fn label(&self, dimension: impl Into<String>) -> Result<SteeringVector> {
        SteeringVector::from_raw(
            dimension,
            &self.raw,
            0.0,
            Stage::Expand,
            VectorOrigin::Expanded {
                component: self.component,
            },
            Some(self.variance_explained),
        )
    }
}

/// Diagnostics for one expansion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionReport {
    pub primary: String,
    pub pairs: usize,
    pub requested: usize,
    pub returned: usize,
    /// Explained-variance ratio of every non-trivial component, largest first.
    pub variance_ratios: Vec<f64>,
    /// |cosine| between component 1 and the mean pair difference (the
    /// primary learned direction). Near 1 means the skip was the right call.
    pub first_component_alignment: f64,
}

#[derive(Debug, Clone)]
pub struct Expansion {
    pub directions: Vec<PrincipalDirection>,
    pub report: ExpansionReport,
}

/// Derives additional orthogonal steering directions from one labeled dimension.
#[derive(Debug, Clone, Default)]
pub struct DimensionExpander {
    config: SteeringConfig,
}

impl DimensionExpander {
    pub fn new(config: SteeringConfig) -> Self {
        Self { config }
    }

    /// Up to `k` directions beyond the primary one.
    pub fn expand(&self, primary: &str, pairs: &PairedEmbeddings, k: usize) -> Result<Vec<PrincipalDirection>> {
        self.expand_with_report(primary, pairs, k).map(|e| e.directions)
    }

    /// Expand and name the directions with `labels`, in component order.
    ///
    /// `labels.len()` is the number of directions requested. Fewer vectors
    /// come back when the remaining variance is negligible.
    pub fn expand_labeled<S: AsRef<str>>(
        &self,
        primary: &str,
        pairs: &PairedEmbeddings,
        labels: &[S],
    ) -> Result<Vec<SteeringVector>> {
        self.expand_labeled_with_report(primary, pairs, labels)
            .map(|(vectors, _)| vectors)
    }

    pub fn expand_labeled_with_report<S: AsRef<str>>(
        &self,
        primary: &str,
        pairs: &PairedEmbeddings,
        labels: &[S],
    ) -> Result<(Vec<SteeringVector>, ExpansionReport)> {
        let mut seen = BTreeSet::new();
        for label in labels {
            let label = label.as_ref();
            if label.is_empty() || label == primary || !seen.insert(label) {
                return Err(Error::InvalidConfig(format!(
                    "expanded dimension label `{label}` must be non-empty, unique and differ from `{primary}`"
                )));
            }
        }

        let expansion = self.expand_with_report(primary, pairs, labels.len())?;
        let vectors = expansion
            .directions
            .iter()
            .zip(labels)
            .map(|(direction, label)| direction.label(label.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok((vectors, expansion.report))
    }

    pub fn expand_with_report(&self, primary: &str, pairs: &PairedEmbeddings, k: usize) -> Result<Expansion> {
        let n = pairs.len();
        let required = (k + 1).max(2);
        if n < required {
            return Err(Error::InsufficientData {
                stage: Stage::Expand,
                dimension: primary.to_string(),
                required,
                actual: n,
            });
        }

        let dim = pairs.dim();
        let differences = pairs.differences();

        let mut mean = vec![0.0f64; dim];
        for row in &differences {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n as f64;
        }

        let centred: Vec<Vec<f64>> = differences
            .iter()
            .map(|row| row.iter().zip(&mean).map(|(x, m)| x - m).collect())
            .collect();

        let axes = principal_axes(&centred, dim, k + 1);
        let total: f64 = axes.values.iter().map(|v| v.max(0.0)).sum();

        let mut report = ExpansionReport {
            primary: primary.to_string(),
            pairs: n,
            requested: k,
            returned: 0,
            variance_ratios: Vec::new(),
            first_component_alignment: 0.0,
        };

        if total <= f64::EPSILON {
            debug!(primary, "pair differences carry no variance; nothing to expand");
            return Ok(Expansion {
                directions: Vec::new(),
                report,
            });
        }

        for value in &axes.values {
            let ratio = value.max(0.0) / total;
            if ratio < self.config.min_variance_ratio {
                break;
            }
            report.variance_ratios.push(ratio);
        }
        let components: Vec<(f64, Vec<f64>)> = report
            .variance_ratios
            .iter()
            .copied()
            .zip(axes.raw)
            .collect();

        if let Some((_, first)) = components.first() {
            let norm_first = kernels::norm_f64(first);
            let norm_mean = kernels::norm_f64(&mean);
            if norm_first > 0.0 && norm_mean > 0.0 {
                let dot: f64 = first.iter().zip(&mean).map(|(a, b)| a * b).sum();
                report.first_component_alignment = (dot / (norm_first * norm_mean)).abs();
            }
        }

        let directions: Vec<PrincipalDirection> = components
            .into_iter()
            .enumerate()
            .skip(1)
            .take(k)
            .map(|(idx, (ratio, raw))| {
                let norm = kernels::norm_f64(&raw);
                let direction = Vector::new(raw.iter().map(|x| (x / norm) as f32).collect());
                PrincipalDirection {
                    component: idx + 1,
                    raw,
                    direction,
                    variance_explained: ratio as f32,
                }
            })
            .collect();

        report.returned = directions.len();
        info!(
            primary,
            requested = k,
            returned = report.returned,
            first_component_alignment = report.first_component_alignment,
            "expanded steering dimensions"
        );

        Ok(Expansion { directions, report })
    }
}

/// Eigenvalues of the centred differences' scatter, largest first, and the
/// leading axes in embedding space. Each axis has norm `sqrt(eigenvalue)` and
/// is sign-fixed so its largest-magnitude coordinate is positive.
struct PrincipalAxes {
    values: Vec<f64>,
    raw: Vec<Vec<f64>>,
}

fn principal_axes(centred: &[Vec<f64>], dim: usize, keep: usize) -> PrincipalAxes {
    if centred.len() <= dim {
        gram_axes(centred, dim, keep)
    } else {
        scatter_axes(centred, dim, keep)
    }
}

/// Decompose `X X^T` and map each eigenvector back as `X^T u`.
fn gram_axes(centred: &[Vec<f64>], dim: usize, keep: usize) -> PrincipalAxes {
    let n = centred.len();
    let mut gram = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in i..n {
            let g: f64 = centred[i].iter().zip(&centred[j]).map(|(a, b)| a * b).sum();
            gram[i][j] = g;
            gram[j][i] = g;
        }
    }

    let eigen = symmetric_eigen(gram);
    let raw = eigen
        .vectors
        .iter()
        .take(keep)
        .map(|u| {
            let mut out = vec![0.0f64; dim];
            for (row, weight) in centred.iter().zip(u) {
                for (o, x) in out.iter_mut().zip(row) {
                    *o += weight * x;
                }
            }
            fix_sign(out)
        })
        .collect();
    PrincipalAxes {
        values: eigen.values,
        raw,
    }
}

/// Decompose `X^T X` directly and scale each unit eigenvector by
/// `sqrt(eigenvalue)`.
fn scatter_axes(centred: &[Vec<f64>], dim: usize, keep: usize) -> PrincipalAxes {
    let mut scatter = vec![vec![0.0f64; dim]; dim];
    for row in centred {
        for i in 0..dim {
            if row[i] == 0.0 {
                continue;
            }
            for j in i..dim {
                scatter[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..dim {
        for j in 0..i {
            scatter[i][j] = scatter[j][i];
        }
    }

    let eigen = symmetric_eigen(scatter);
    let raw = eigen
        .vectors
        .iter()
        .zip(&eigen.values)
        .take(keep)
        .map(|(v, value)| {
            let scale = value.max(0.0).sqrt();
            fix_sign(v.iter().map(|x| x * scale).collect())
        })
        .collect();
    PrincipalAxes {
        values: eigen.values,
        raw,
    }
}

fn fix_sign(mut axis: Vec<f64>) -> Vec<f64> {
    let pivot = axis
        .iter()
        .copied()
        .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        for x in &mut axis {
            *x = -*x;
        }
    }
    axis
}
