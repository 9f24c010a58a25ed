//! # SteerX Similarity
//!
//! Semantic validation of steered text.
//!
//! Every dimension is anchored by a low and a high descriptor text. A
//! candidate's cosine similarity to each pole says which side of the
//! dimension it landed on; comparing that balance to the dial value gives an
//! alignment score in [0, 1].
//!
//! ## Features
//!
//! - **Validation**: Per-dimension similarities and alignment for one candidate
//! - **Selection**: Rank candidates by similarity to the blended dial target
//! - **Comparison**: Validate the same dials across several response sources
//! - **Presets**: Built-in descriptors for conversational and love/hate axes
//!
//! ## Example
//!
//! ```rust
//! use steerx_core::{DialSetting, HashingEmbedder, SteeringConfig};
//! use steerx_similarity::{presets, SemanticValidator};
//!
//! let validator = SemanticValidator::new(
//!     HashingEmbedder::new(128).unwrap(),
//!     presets::love(),
//!     SteeringConfig::default(),
//! )
//! .unwrap();
//!
//! let dials = DialSetting::new().with("love", 0.9).unwrap();
//! let best = validator
//!     .select_best(&dials, &["I loathe and dread this", "I cherish and adore this"])
//!     .unwrap();
//! assert_eq!(best.index, 1);
//! ```

pub mod alignment;
pub mod descriptor;
pub mod presets;
pub mod report;
pub mod validator;

pub use alignment::{alignment, expected_similarity, high_share};
pub use descriptor::{DescriptorIndex, DescriptorSet, DimensionDescriptors, PoleEmbeddings};
pub use report::{Selection, ValidationReport, ValidationResult};
pub use validator::SemanticValidator;
