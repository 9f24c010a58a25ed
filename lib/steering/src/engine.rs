use crate::{DimensionExpander, ExpansionReport, LearnReport, SteeringComposer, VectorLearner};
use std::sync::Arc;
use steerx_core::{
    embed_checked, ContrastiveExample, DialSetting, Embedder, Result, SnapshotInfo, Stage, SteeringConfig,
    Vector, VectorStore,
};
use tracing::info;

/// Learner, expander and composer wired to one embedder and one store.
pub struct SteeringEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    learner: VectorLearner<Arc<dyn Embedder>>,
    expander: DimensionExpander,
    composer: SteeringComposer,
    config: SteeringConfig,
}

impl SteeringEngine {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, config: SteeringConfig) -> Self {
        Self {
            learner: VectorLearner::new(embedder.clone(), config.clone()),
            expander: DimensionExpander::new(config.clone()),
            composer: SteeringComposer::new(config.clone()),
            embedder,
            store,
            config,
        }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Learn one dimension and save it, replacing any previous vector.
    pub fn learn(&self, dimension: &str, examples: &[ContrastiveExample]) -> Result<LearnReport> {
        let learned = self.learner.learn_with_report(dimension, examples)?;
        self.store.save(learned.vector)?;
        Ok(learned.report)
    }

    /// Learn `primary`, derive one extra dimension per label from the same
    /// pairs, and write all of them to the store in a single merge.
    ///
    /// Dimensions not named here are kept as the store holds them at write
    /// time.
    pub fn learn_with_expansion<S: AsRef<str>>(
        &self,
        primary: &str,
        examples: &[ContrastiveExample],
        labels: &[S],
    ) -> Result<(LearnReport, ExpansionReport)> {
        let learned = self.learner.learn_with_report(primary, examples)?;
        let (mut vectors, expansion) = self
            .expander
            .expand_labeled_with_report(primary, &learned.embeddings, labels)?;
        vectors.insert(0, learned.vector);

        info!(
            primary,
            expanded = expansion.returned,
            "merging steering vectors"
        );
        self.store.merge_all(vectors)?;
        Ok((learned.report, expansion))
    }

    /// Compose against the store's current snapshot. `strength` defaults to
    /// the configured one.
    pub fn compose(&self, base: &Vector, dials: &DialSetting, strength: Option<f32>) -> Result<Vector> {
        let snapshot = self.store.snapshot();
        let strength = strength.unwrap_or(self.config.default_strength);
        self.composer.compose(base, dials, &snapshot, strength)
    }

    /// Embed `text` and steer it.
    pub fn compose_text(&self, text: &str, dials: &DialSetting, strength: Option<f32>) -> Result<Vector> {
        let base = embed_checked(self.embedder.as_ref(), text, Stage::Compose, "base")?;
        self.compose(&base, dials, strength)
    }

    pub fn info(&self) -> SnapshotInfo {
        self.store.snapshot().info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use steerx_core::{Error, HashingEmbedder, SteeringVector, VectorSnapshot};

    /// `pending` is saved on the next snapshot read or merge, standing in
    /// for another writer that lands while the engine is working.
    #[derive(Default)]
    struct TestStore {
        current: Mutex<Arc<VectorSnapshot>>,
        pending: Mutex<Option<SteeringVector>>,
    }

    impl TestStore {
        fn land_pending(&self) {
            if let Some(vector) = self.pending.lock().unwrap().take() {
                self.save(vector).unwrap();
            }
        }
    }

    impl VectorStore for TestStore {
        fn snapshot(&self) -> Arc<VectorSnapshot> {
            self.land_pending();
            self.current.lock().unwrap().clone()
        }

        fn save(&self, vector: SteeringVector) -> Result<()> {
            let mut current = self.current.lock().unwrap();
            *current = Arc::new(current.with_vector(vector)?);
            Ok(())
        }

        fn replace_all(&self, vectors: Vec<SteeringVector>) -> Result<()> {
            let mut current = self.current.lock().unwrap();
            *current = Arc::new(current.replaced(vectors)?);
            Ok(())
        }

        fn merge_all(&self, vectors: Vec<SteeringVector>) -> Result<()> {
            self.land_pending();
            let mut current = self.current.lock().unwrap();
            *current = Arc::new(current.merged(vectors)?);
            Ok(())
        }

        fn delete(&self, dimension: &str) -> Result<bool> {
            let mut current = self.current.lock().unwrap();
            let existed = current.contains(dimension);
            *current = Arc::new(current.without(dimension));
            Ok(existed)
        }
    }

    fn engine() -> SteeringEngine {
        SteeringEngine::new(
            Arc::new(HashingEmbedder::new(64).unwrap()),
            Arc::new(TestStore::default()),
            SteeringConfig::default(),
        )
    }

    fn love_examples() -> Vec<ContrastiveExample> {
        [
            ("I cherish every moment with you", "I resent every moment with you"),
            ("your kindness warms my heart", "your coldness hardens my heart"),
            ("I adore the way you laugh", "I despise the way you laugh"),
            ("you make my days brighter", "you make my days darker"),
            ("I treasure our friendship", "I regret our friendship"),
        ]
        .into_iter()
        .map(|(p, n)| ContrastiveExample::new(p, n))
        .collect()
    }

    #[test]
    fn test_learn_saves_vector() {
        let engine = engine();
        let report = engine.learn("love", &love_examples()).unwrap();
        assert_eq!(report.pairs, 5);
        assert!(engine.store().list().contains("love"));
        assert_eq!(engine.info().embedding_dim, 64);
    }

    #[test]
    fn test_learn_with_expansion_replaces_atomically() {
        let engine = engine();
        engine.learn("irony", &love_examples()).unwrap();
        let before = engine.store().snapshot();

        let (_, expansion) = engine
            .learn_with_expansion("love", &love_examples(), &["commitment", "trust"])
            .unwrap();
        assert_eq!(expansion.returned, 2);

        let after = engine.store().snapshot();
        assert_eq!(after.version(), before.version() + 1);
        assert_eq!(
            after.dimensions().into_iter().collect::<Vec<_>>(),
            vec!["commitment", "irony", "love", "trust"]
        );
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn test_learn_with_expansion_keeps_concurrent_save() {
        let store = Arc::new(TestStore::default());
        let engine = SteeringEngine::new(
            Arc::new(HashingEmbedder::new(64).unwrap()),
            store.clone(),
            SteeringConfig::default(),
        );
        engine.learn("love", &love_examples()).unwrap();
        let irony = engine.learner.learn("irony", &love_examples()).unwrap();
        *store.pending.lock().unwrap() = Some(irony.clone());

        engine
            .learn_with_expansion("love", &love_examples(), &["trust"])
            .unwrap();

        let after = store.snapshot();
        assert_eq!(
            after.dimensions().into_iter().collect::<Vec<_>>(),
            vec!["irony", "love", "trust"]
        );
        assert_eq!(after.get("irony"), Some(&irony));
    }

    #[test]
    fn test_compose_uses_store() {
        let engine = engine();
        engine.learn("love", &love_examples()).unwrap();

        let dials = DialSetting::from_pairs([("love", 0.5)]).unwrap();
        let base = engine.embedder().embed("a quiet afternoon").unwrap();
        assert_eq!(engine.compose(&base, &dials, None).unwrap(), base);

        let unknown = DialSetting::from_pairs([("irony", 0.9)]).unwrap();
        assert!(matches!(
            engine.compose_text("a quiet afternoon", &unknown, None),
            Err(Error::UnknownDimension { .. })
        ));
    }
}
