//! JSON-file-backed vector store
//!
//! The whole snapshot is one pretty-printed JSON document. Writes go to a
//! temporary file that is renamed over the old document, and only then is the
//! in-memory snapshot swapped, so a crash leaves either the old or the new
//! file on disk and a failed write leaves readers on the old set.

use atomicwrites::{AllowOverwrite, AtomicFile};
use parking_lot::RwLock;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use steerx_core::{Error, Result, SteeringVector, VectorSnapshot, VectorStore};
use tracing::{debug, info};

pub const VECTORS_FILE: &str = "vectors.json";

#[derive(Debug)]
pub struct FileVectorStore {
    path: PathBuf,
    current: RwLock<Arc<VectorSnapshot>>,
}

impl FileVectorStore {
    /// Open (or create) the store under `data_dir`.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(VECTORS_FILE);

        let snapshot = if path.exists() {
            let snapshot = read_document(&path)?;
            info!(
                path = %path.display(),
                vectors = snapshot.len(),
                version = snapshot.version(),
                "loaded steering vectors"
            );
            snapshot
        } else {
            debug!(path = %path.display(), "no stored vectors yet");
            VectorSnapshot::empty()
        };

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, build: F) -> Result<Arc<VectorSnapshot>>
    where
        F: FnOnce(&VectorSnapshot) -> Result<VectorSnapshot>,
    {
        let mut current = self.current.write();
        let next = build(&current)?;
        write_document(&self.path, &next)?;
        let next = Arc::new(next);
        *current = next.clone();
        Ok(next)
    }
}

impl VectorStore for FileVectorStore {
    fn snapshot(&self) -> Arc<VectorSnapshot> {
        self.current.read().clone()
    }

    fn save(&self, vector: SteeringVector) -> Result<()> {
        let dimension = vector.dimension().to_string();
        let next = self.update(|current| current.with_vector(vector))?;
        info!(dimension = %dimension, version = next.version(), "saved steering vector");
        Ok(())
    }

    fn replace_all(&self, vectors: Vec<SteeringVector>) -> Result<()> {
        let next = self.update(|current| current.replaced(vectors))?;
        info!(vectors = next.len(), version = next.version(), "replaced steering vectors");
        Ok(())
    }

    fn merge_all(&self, vectors: Vec<SteeringVector>) -> Result<()> {
        let next = self.update(|current| current.merged(vectors))?;
        info!(vectors = next.len(), version = next.version(), "merged steering vectors");
        Ok(())
    }

    fn delete(&self, dimension: &str) -> Result<bool> {
        let mut existed = false;
        self.update(|current| {
            existed = current.contains(dimension);
            Ok(current.without(dimension))
        })?;
        Ok(existed)
    }
}

/// Parse a stored document and re-check every invariant.
pub(crate) fn read_document(path: &Path) -> Result<VectorSnapshot> {
    let data = std::fs::read_to_string(path)?;
    let stored: VectorSnapshot = serde_json::from_str(&data)?;
    revalidate(stored)
}

pub(crate) fn revalidate(stored: VectorSnapshot) -> Result<VectorSnapshot> {
    for (vector, name) in stored.iter().zip(stored.dimensions()) {
        if vector.dimension() != name {
            return Err(Error::Storage(format!(
                "stored key `{name}` holds vector for `{}`",
                vector.dimension()
            )));
        }
        vector.validate()?;
    }
    VectorSnapshot::from_vectors(stored.version(), stored.iter().cloned().collect())
}

fn write_document(path: &Path, snapshot: &VectorSnapshot) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    AtomicFile::new(path, AllowOverwrite)
        .write(|file| file.write_all(&bytes))
        .map_err(|e| Error::Storage(format!("writing {}: {e}", path.display())))?;
    Ok(())
}
