use parking_lot::RwLock;
use std::sync::Arc;
use steerx_core::{Result, SteeringVector, VectorSnapshot, VectorStore};
use tracing::info;

/// In-process copy-on-write store.
///
/// Every write builds a fresh [`VectorSnapshot`] from the current one and
/// swaps the `Arc`. Readers that already hold a snapshot keep seeing it.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    current: RwLock<Arc<VectorSnapshot>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of vectors.
    pub fn with_vectors(vectors: Vec<SteeringVector>) -> Result<Self> {
        Ok(Self {
            current: RwLock::new(Arc::new(VectorSnapshot::from_vectors(0, vectors)?)),
        })
    }

    /// Build the next snapshot from the current one and swap it in. The write
    /// lock is held across the build, so writers never lose each other's
    /// updates.
    fn update<F>(&self, build: F) -> Result<Arc<VectorSnapshot>>
    where
        F: FnOnce(&VectorSnapshot) -> Result<VectorSnapshot>,
    {
        let mut current = self.current.write();
        let next = Arc::new(build(&current)?);
        *current = next.clone();
        Ok(next)
    }
}

impl VectorStore for MemoryVectorStore {
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

#[cfg(test)]
mod tests {
    use super::*;
    use steerx_core::{Error, Stage, VectorOrigin};

    fn vector(name: &str, raw: &[f64]) -> SteeringVector {
        SteeringVector::from_raw(name, raw, 1e-6, Stage::Learn, VectorOrigin::Learned, None).unwrap()
    }

    #[test]
    fn test_save_load_list_delete() {
        let store = MemoryVectorStore::new();
        store.save(vector("love", &[1.0, 0.0])).unwrap();
        store.save(vector("irony", &[0.0, 1.0])).unwrap();

        assert_eq!(store.load("love").unwrap().dimension(), "love");
        assert_eq!(store.list().into_iter().collect::<Vec<_>>(), vec!["irony", "love"]);
        assert!(store.delete("love").unwrap());
        assert!(!store.delete("love").unwrap());
        assert!(matches!(store.load("love"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let store = MemoryVectorStore::new();
        store.save(vector("love", &[1.0, 0.0])).unwrap();
        let held = store.snapshot();

        store
            .replace_all(vec![vector("trust", &[0.0, 1.0]), vector("commitment", &[1.0, 1.0])])
            .unwrap();

        assert_eq!(held.dimensions().into_iter().collect::<Vec<_>>(), vec!["love"]);
        let now = store.snapshot();
        assert_eq!(now.len(), 2);
        assert!(!now.contains("love"));
        assert!(now.version() > held.version());
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let store = MemoryVectorStore::new();
        store.save(vector("love", &[1.0, 0.0])).unwrap();
        let before = store.snapshot();

        assert!(store.save(vector("irony", &[0.0, 1.0, 0.0])).is_err());
        assert!(store
            .replace_all(vec![vector("a", &[1.0]), vector("a", &[1.0])])
            .is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_concurrent_readers_see_whole_sets() {
        let store = Arc::new(MemoryVectorStore::new());
        let sets = [
            vec![vector("a", &[1.0, 0.0]), vector("b", &[0.0, 1.0])],
            vec![vector("c", &[1.0, 0.0]), vector("d", &[0.0, 1.0])],
        ];

        let writer = {
            let store = store.clone();
            let sets = sets.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    store.replace_all(sets[i % 2].clone()).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let snap = store.snapshot();
            let names: Vec<String> = snap.dimensions().into_iter().collect();
            assert!(names.is_empty() || names == ["a", "b"] || names == ["c", "d"]);
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_merge_all_keeps_concurrent_saves() {
        let store = Arc::new(MemoryVectorStore::new());
        let saver = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    store.save(vector(&format!("saved{i}"), &[1.0, 0.0])).unwrap();
                }
            })
        };

        for i in 0..100 {
            store
                .merge_all(vec![vector("love", &[1.0, i as f64]), vector("trust", &[0.0, 1.0])])
                .unwrap();
        }
        saver.join().unwrap();

        let snap = store.snapshot();
        assert_eq!(snap.len(), 102);
        assert!((0..100).all(|i| snap.contains(&format!("saved{i}"))));
    }
}
