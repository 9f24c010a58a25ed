//! Embedder contract
//!
//! The embedding model is an external collaborator: the engine only sees a
//! pure `text -> vector` function whose output width is fixed for a
//! deployment. Every call site goes through [`embed_checked`] / [`embed_all`],
//! which refuse vectors of the wrong length instead of padding or truncating.

use crate::{Error, Result, Stage, Vector};
use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Default width of the hashing embedder.
pub const DEFAULT_HASHING_DIM: usize = 256;

/// Maps text to a fixed-length vector.
///
/// Implementations must be safe to call from several threads at once:
/// independent texts are embedded in parallel.
pub trait Embedder: Send + Sync {
    /// Width of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vector>;
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        (**self).embed(text)
    }
}

impl<E: Embedder + ?Sized> Embedder for std::sync::Arc<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        (**self).embed(text)
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        (**self).embed(text)
    }
}

/// Embed one text and check its width.
///
/// `dimension` names the steering dimension being processed, for error
/// context. Embedder failures are surfaced as `Error::Embedding` tagged with
/// `stage`.
pub fn embed_checked<E: Embedder + ?Sized>(
    embedder: &E,
    text: &str,
    stage: Stage,
    dimension: &str,
) -> Result<Vector> {
    let vector = embedder.embed(text).map_err(|err| match err {
        Error::Embedding { message, .. } => Error::Embedding { stage, message },
        other => Error::Embedding {
            stage,
            message: other.to_string(),
        },
    })?;

    let expected = embedder.dimension();
    if vector.dim() != expected {
        return Err(Error::DimensionMismatch {
            stage,
            dimension: dimension.to_string(),
            expected,
            actual: vector.dim(),
        });
    }
    Ok(vector)
}

/// Embed a batch of texts in parallel, preserving input order.
///
/// All calls are joined before returning; the first failure wins.
pub fn embed_all<E, S>(embedder: &E, texts: &[S], stage: Stage, dimension: &str) -> Result<Vec<Vector>>
where
    E: Embedder + ?Sized,
    S: AsRef<str> + Sync,
{
    debug!(%stage, dimension, texts = texts.len(), "embedding batch");
    texts
        .par_iter()
        .map(|text| embed_checked(embedder, text.as_ref(), stage, dimension))
        .collect()
}

/// Deterministic feature-hashing embedder.
///
/// Words and character trigrams are hashed into buckets (words weigh more),
/// then the vector is L2-normalized. It needs no model files, which makes it
/// the embedder of choice for the CLI, benches and offline experiments.
/// Lexical overlap is all it captures.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("hashing embedder dimension must be > 0".to_string()));
        }
        Ok(Self { dim })
    }

    fn bucket(&self, feature: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_HASHING_DIM,
        }
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for trigram in generate_trigrams(&normalized) {
            vector[self.bucket(&trigram)] += 1.0;
        }

        // Words contribute more than trigrams
        for word in normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[self.bucket(word)] += 2.0;
        }

        let mut vector = Vector::new(vector);
        vector.normalize();
        Ok(vector)
    }
}

/// Character trigrams of a padded string.
fn generate_trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {}  ", s.trim());
    let chars: Vec<char> = padded.chars().collect();

    if s.trim().is_empty() {
        return HashSet::new();
    }

    chars.windows(3).map(|w| w.iter().collect::<String>()).collect()
}
