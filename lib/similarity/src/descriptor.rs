//! Pole descriptors
//!
//! Each dimension is anchored by a short low-pole text and a short high-pole
//! text. The validator embeds every descriptor once, up front, and keeps the
//! embeddings in a [`DescriptorIndex`].

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use steerx_core::{embed_all, Embedder, Error, Result, Stage, Vector};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDescriptors {
    pub low: String,
    pub high: String,
}

impl DimensionDescriptors {
    pub fn new(low: impl Into<String>, high: impl Into<String>) -> Self {
        Self {
            low: low.into(),
            high: high.into(),
        }
    }
}

/// Descriptors for a set of dimensions, keyed by dimension name.
///
/// Empty names or empty pole texts are rejected on insert and on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, DimensionDescriptors>",
    into = "BTreeMap<String, DimensionDescriptors>"
)]
pub struct DescriptorSet {
    dimensions: BTreeMap<String, DimensionDescriptors>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dimension: impl Into<String>, low: impl Into<String>, high: impl Into<String>) -> Result<()> {
        let dimension = dimension.into();
        let descriptors = DimensionDescriptors::new(low, high);
        if dimension.trim().is_empty() {
            return Err(Error::InvalidConfig("descriptor dimension name is empty".to_string()));
        }
        if descriptors.low.trim().is_empty() || descriptors.high.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "descriptors for `{dimension}` need non-empty low and high texts"
            )));
        }
        self.dimensions.insert(dimension, descriptors);
        Ok(())
    }

    pub fn with(mut self, dimension: impl Into<String>, low: impl Into<String>, high: impl Into<String>) -> Result<Self> {
        self.insert(dimension, low, high)?;
        Ok(self)
    }

    /// Build from compile-time entries whose texts are known to be non-empty.
    pub(crate) fn from_static(entries: &[(&str, &str, &str)]) -> Self {
        Self {
            dimensions: entries
                .iter()
                .map(|(dimension, low, high)| (dimension.to_string(), DimensionDescriptors::new(*low, *high)))
                .collect(),
        }
    }

    /// Add every entry of `other`, replacing same-named ones.
    pub fn merge(&mut self, other: DescriptorSet) {
        self.dimensions.extend(other.dimensions);
    }

    /// Load `{ "dimension": { "low": "...", "high": "..." }, ... }`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    #[inline]
    pub fn get(&self, dimension: &str) -> Option<&DimensionDescriptors> {
        self.dimensions.get(dimension)
    }

    #[inline]
    pub fn contains(&self, dimension: &str) -> bool {
        self.dimensions.contains_key(dimension)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DimensionDescriptors)> {
        self.dimensions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TryFrom<BTreeMap<String, DimensionDescriptors>> for DescriptorSet {
    type Error = Error;

    fn try_from(map: BTreeMap<String, DimensionDescriptors>) -> Result<Self> {
        let mut set = DescriptorSet::new();
        for (dimension, d) in map {
            set.insert(dimension, d.low, d.high)?;
        }
        Ok(set)
    }
}

impl From<DescriptorSet> for BTreeMap<String, DimensionDescriptors> {
    fn from(set: DescriptorSet) -> Self {
        set.dimensions
    }
}

/// Embedded pole descriptors for one dimension.
#[derive(Debug, Clone)]
pub struct PoleEmbeddings {
    pub low: Vector,
    pub high: Vector,
}

/// Descriptor embeddings, computed once per validator.
#[derive(Debug, Clone, Default)]
pub struct DescriptorIndex {
    poles: AHashMap<String, PoleEmbeddings>,
    dim: usize,
}

impl DescriptorIndex {
    pub fn build<E: Embedder + ?Sized>(embedder: &E, descriptors: &DescriptorSet) -> Result<Self> {
        let names: Vec<&str> = descriptors.iter().map(|(name, _)| name).collect();
        let texts: Vec<&str> = descriptors
            .iter()
            .flat_map(|(_, d)| [d.low.as_str(), d.high.as_str()])
            .collect();

        let embedded = embed_all(embedder, &texts, Stage::Validate, "descriptors")?;
        let mut poles = AHashMap::with_capacity(names.len());
        for (name, pair) in names.iter().zip(embedded.chunks_exact(2)) {
            poles.insert(
                name.to_string(),
                PoleEmbeddings {
                    low: pair[0].clone(),
                    high: pair[1].clone(),
                },
            );
        }

        debug!(dimensions = poles.len(), "embedded pole descriptors");
        Ok(Self {
            poles,
            dim: embedder.dimension(),
        })
    }

    /// Pole embeddings for `dimension`, or `MissingDescriptor` tagged with `stage`.
    pub fn poles(&self, dimension: &str, stage: Stage) -> Result<&PoleEmbeddings> {
        self.poles.get(dimension).ok_or_else(|| Error::MissingDescriptor {
            stage,
            dimension: dimension.to_string(),
        })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.poles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.poles.is_empty()
    }
}
