//! # SteerX Steering
//!
//! Learning, expanding and applying steering vectors.
//!
//! - [`VectorLearner`] - One unit direction per dimension from contrastive pairs
//! - [`DimensionExpander`] - Extra orthogonal directions from the pair differences (PCA)
//! - [`SteeringComposer`] - Dial-weighted sum of directions added to a base embedding
//! - [`SteeringEngine`] - The three above wired to an embedder and a [`VectorStore`](steerx_core::VectorStore)
//!
//! ## Example
//!
//! ```rust
//! use steerx_core::{ContrastiveExample, DialSetting, Embedder, HashingEmbedder, SteeringConfig, VectorSnapshot};
//! use steerx_steering::{SteeringComposer, VectorLearner};
//!
//! let learner = VectorLearner::new(HashingEmbedder::new(64).unwrap(), SteeringConfig::default());
//! let love = learner
//!     .learn(
//!         "love",
//!         &[
//!             ContrastiveExample::new("I cherish you", "I resent you"),
//!             ContrastiveExample::new("I adore this", "I despise this"),
//!         ],
//!     )
//!     .unwrap();
//!
//! let vectors = VectorSnapshot::from_vectors(1, vec![love]).unwrap();
//! let base = learner.embedder().embed("a walk in the park").unwrap();
//! let dials = DialSetting::new().with("love", 0.9).unwrap();
//!
//! let steered = SteeringComposer::default().compose(&base, &dials, &vectors, 1.0).unwrap();
//! assert!((steered.norm() - base.norm()).abs() < 1e-5);
//! ```

mod eigen;

pub mod composer;
pub mod engine;
pub mod expander;
pub mod learner;

pub use composer::SteeringComposer;
pub use engine::SteeringEngine;
pub use expander::{DimensionExpander, Expansion, ExpansionReport, PrincipalDirection};
pub use learner::{LearnReport, Learned, VectorLearner};
