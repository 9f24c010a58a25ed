pub mod dataset;
pub mod file;
pub mod memory;
pub mod snapshot;

pub use dataset::{DatasetOptions, PairDataset, MAX_TEXT_CHARS, MIN_TEXT_CHARS};
pub use file::{FileVectorStore, VECTORS_FILE};
pub use memory::MemoryVectorStore;
pub use snapshot::{SnapshotDescription, SnapshotManager};
