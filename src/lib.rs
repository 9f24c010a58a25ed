//! # SteerX
//!
//! A steering-vector engine: learn semantic directions from contrastive text
//! pairs, steer embeddings with dial settings, and check generated text
//! against the dials that were meant to shape it.
//!
//! ## Quick Start
//!
//! ### From the Command Line
//!
//! ```bash
//! steerx learn love --pairs data/contrastive_pairs.json --expand commitment,trust
//! steerx info
//! steerx validate --dial love=0.9 "I deeply cherish this moment"
//! steerx select --dial love=0.9 "I hate this" "It is fine" "I adore this deeply"
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use steerx::prelude::*;
//! use std::sync::Arc;
//!
//! let engine = SteeringEngine::new(
//!     Arc::new(HashingEmbedder::new(64).unwrap()),
//!     Arc::new(MemoryVectorStore::new()),
//!     SteeringConfig::default(),
//! );
//!
//! let pairs = vec![
//!     ContrastiveExample::new("I cherish this deeply", "I resent this deeply"),
//!     ContrastiveExample::new("I adore our time together", "I despise our time together"),
//! ];
//! engine.learn("love", &pairs).unwrap();
//!
//! let dials = DialSetting::new().with("love", 0.9).unwrap();
//! let steered = engine.compose_text("a walk in the park", &dials, None).unwrap();
//! assert_eq!(steered.dim(), 64);
//! ```
//!
//! ## Crate Structure
//!
//! - [`steerx-core`](steerx_core) - Vectors, dial settings, steering vectors, errors, embedder and store contracts
//! - [`steerx-steering`](steerx_steering) - Learning, PCA expansion, composition
//! - [`steerx-similarity`](steerx_similarity) - Descriptor-based validation and candidate selection
//! - [`steerx-storage`](steerx_storage) - Memory and JSON-file stores, snapshot archives, pair datasets

// Re-export core types
pub use steerx_core::{
    ContrastiveExample, DialLevel, DialSetting, Embedder, Error, HashingEmbedder, PairedEmbeddings, Result,
    SnapshotInfo, Stage, SteeringConfig, SteeringVector, Vector, VectorOrigin, VectorSnapshot, VectorStore,
};

// Re-export steering
pub use steerx_steering::{
    DimensionExpander, ExpansionReport, LearnReport, PrincipalDirection, SteeringComposer, SteeringEngine,
    VectorLearner,
};

// Re-export validation
pub use steerx_similarity::{
    presets, DescriptorSet, DimensionDescriptors, SemanticValidator, Selection, ValidationReport, ValidationResult,
};

// Re-export storage
pub use steerx_storage::{FileVectorStore, MemoryVectorStore, PairDataset, SnapshotManager};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ContrastiveExample, DescriptorSet, DialSetting, DimensionExpander, Embedder, Error, FileVectorStore,
        HashingEmbedder, MemoryVectorStore, Result, SemanticValidator, SteeringComposer, SteeringConfig,
        SteeringEngine, SteeringVector, Vector, VectorLearner, VectorSnapshot, VectorStore,
    };
}
