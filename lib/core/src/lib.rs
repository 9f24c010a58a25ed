//! # SteerX Core
//!
//! Core types for the SteerX steering-vector engine.
//!
//! - [`Vector`] - Dense embedding vector with f64-accumulated kernels
//! - [`ContrastiveExample`] / [`PairedEmbeddings`] - Labeled pole pairs and their embeddings
//! - [`SteeringVector`] - Unit direction for one named dimension
//! - [`DialSetting`] - Validated per-request dial values in [0, 1]
//! - [`Embedder`] - Text embedding contract (plus the offline [`HashingEmbedder`])
//! - [`VectorStore`] / [`VectorSnapshot`] - Persistence contract and immutable vector sets
//!
//! ## Example
//!
//! ```rust
//! use steerx_core::{DialSetting, Embedder, HashingEmbedder};
//!
//! let dials = DialSetting::new().with("love", 0.9).unwrap();
//! assert_eq!(dials.get("love"), Some(0.9));
//!
//! let embedder = HashingEmbedder::new(64).unwrap();
//! let v = embedder.embed("I deeply cherish this").unwrap();
//! assert_eq!(v.dim(), 64);
//! ```

pub mod config;
pub mod dial;
pub mod embedder;
pub mod error;
pub mod example;
pub mod kernels;
pub mod steering;
pub mod store;
pub mod vector;

pub use config::SteeringConfig;
pub use dial::{DialLevel, DialSetting, NEUTRAL};
pub use embedder::{embed_all, embed_checked, Embedder, HashingEmbedder, DEFAULT_HASHING_DIM};
pub use error::{Error, Result, Stage};
pub use example::{ContrastiveExample, PairedEmbeddings};
pub use steering::{SteeringVector, VectorOrigin, UNIT_NORM_TOLERANCE};
pub use store::{SnapshotInfo, VectorSnapshot, VectorStore};
pub use vector::Vector;
