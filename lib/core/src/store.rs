//! Vector store contract
//!
//! Learned vectors live in an immutable [`VectorSnapshot`]. Writers build a
//! new snapshot and swap it in whole, so a reader holding an `Arc` to a
//! snapshot sees either the complete old set or the complete new set.

use crate::{Error, Result, Stage, SteeringVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Immutable, versioned set of steering vectors keyed by dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorSnapshot {
    version: u64,
    vectors: BTreeMap<String, SteeringVector>,
}

/// Summary of a snapshot for operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInfo {
    pub version: u64,
    pub dimensions: Vec<String>,
    pub embedding_dim: usize,
    pub magnitudes: BTreeMap<String, f64>,
    pub variance_explained: BTreeMap<String, f32>,
}

impl VectorSnapshot {
    /// Empty snapshot at version 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot, checking that names are unique and that every
    /// direction has the same width.
    pub fn from_vectors(version: u64, vectors: Vec<SteeringVector>) -> Result<Self> {
        let mut map = BTreeMap::new();
        let mut width: Option<usize> = None;

        for vector in vectors {
            match width {
                None => width = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(Error::DimensionMismatch {
                        stage: Stage::Store,
                        dimension: vector.dimension().to_string(),
                        expected,
                        actual: vector.len(),
                    });
                }
                Some(_) => {}
            }

            let name = vector.dimension().to_string();
            if map.insert(name.clone(), vector).is_some() {
                return Err(Error::InvalidConfig(format!("duplicate steering dimension `{name}`")));
            }
        }

        Ok(Self { version, vectors: map })
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn get(&self, dimension: &str) -> Option<&SteeringVector> {
        self.vectors.get(dimension)
    }

    #[inline]
    pub fn contains(&self, dimension: &str) -> bool {
        self.vectors.contains_key(dimension)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimensions(&self) -> BTreeSet<String> {
        self.vectors.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SteeringVector> {
        self.vectors.values()
    }

    /// Width shared by all vectors, or `None` when empty.
    pub fn embedding_dim(&self) -> Option<usize> {
        self.vectors.values().next().map(SteeringVector::len)
    }

    /// New snapshot with `vector` inserted or replaced, version bumped.
    pub fn with_vector(&self, vector: SteeringVector) -> Result<Self> {
        let mut vectors: Vec<SteeringVector> = self
            .vectors
            .values()
            .filter(|v| v.dimension() != vector.dimension())
            .cloned()
            .collect();
        vectors.push(vector);
        Self::from_vectors(self.version + 1, vectors)
    }

    /// New snapshot without `dimension`, version bumped.
    pub fn without(&self, dimension: &str) -> Self {
        let mut vectors = self.vectors.clone();
        vectors.remove(dimension);
        Self {
            version: self.version + 1,
            vectors,
        }
    }

    /// New snapshot holding exactly `vectors`, version bumped.
    pub fn replaced(&self, vectors: Vec<SteeringVector>) -> Result<Self> {
        Self::from_vectors(self.version + 1, vectors)
    }

    /// New snapshot with every vector in `vectors` inserted or replaced and
    /// all other dimensions kept, version bumped.
    pub fn merged(&self, vectors: Vec<SteeringVector>) -> Result<Self> {
        let written: BTreeSet<&str> = vectors.iter().map(SteeringVector::dimension).collect();
        let mut next: Vec<SteeringVector> = self
            .vectors
            .values()
            .filter(|v| !written.contains(v.dimension()))
            .cloned()
            .collect();
        next.extend(vectors);
        Self::from_vectors(self.version + 1, next)
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            version: self.version,
            dimensions: self.vectors.keys().cloned().collect(),
            embedding_dim: self.embedding_dim().unwrap_or(0),
            magnitudes: self
                .vectors
                .iter()
                .map(|(k, v)| (k.clone(), v.magnitude()))
                .collect(),
            variance_explained: self
                .vectors
                .iter()
                .filter_map(|(k, v)| v.variance_explained().map(|ve| (k.clone(), ve)))
                .collect(),
        }
    }
}

/// Persistence boundary for learned steering vectors.
pub trait VectorStore: Send + Sync {
    /// Current snapshot. Cheap; callers keep it for the duration of a request.
    fn snapshot(&self) -> Arc<VectorSnapshot>;

    /// Insert or replace one vector.
    fn save(&self, vector: SteeringVector) -> Result<()>;

    /// Atomically replace the whole set (retraining).
    fn replace_all(&self, vectors: Vec<SteeringVector>) -> Result<()>;

    /// Insert or replace several vectors in one write, keeping every other
    /// dimension of the snapshot current at write time.
    fn merge_all(&self, vectors: Vec<SteeringVector>) -> Result<()>;

    /// Remove a dimension. Returns whether it existed.
    fn delete(&self, dimension: &str) -> Result<bool>;

    fn load(&self, dimension: &str) -> Result<SteeringVector> {
        self.snapshot()
            .get(dimension)
            .cloned()
            .ok_or_else(|| Error::NotFound(dimension.to_string()))
    }

    fn list(&self) -> BTreeSet<String> {
        self.snapshot().dimensions()
    }
}
