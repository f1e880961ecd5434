//! PageRank service facade
//!
//! Selects an engine, runs it over a store snapshot and persists the ranks as
//! a node property. The engines themselves never write to the store.

use crate::config::{ConfigError, EngineKind, ServiceConfig};
use crate::graph::{GraphError, GraphStore, Label, NodeId, PropertyValue};
use graphrank_algorithms::{
    AlgoError, GraphSource, PageRank, PageRankArrayStorage, PageRankArrayStorageParallel,
    PageRankMapStorage, RankEntry, WorkerPool,
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Algo(#[from] AlgoError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct PageRankService {
    config: ServiceConfig,
}

impl PageRankService {
    pub fn new(config: ServiceConfig) -> ServiceResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Build the configured engine over `source`. The parallel engine gets a
    /// fresh worker pool that lives exactly as long as the engine.
    pub fn create_engine<'g, G: GraphSource + ?Sized>(
        &self,
        source: &'g G,
    ) -> ServiceResult<Box<dyn PageRank + 'g>> {
        let pagerank = self.config.pagerank_config();
        let engine: Box<dyn PageRank + 'g> = match self.config.engine {
            EngineKind::Array => Box::new(PageRankArrayStorage::with_config(source, pagerank)),
            EngineKind::Map => Box::new(PageRankMapStorage::with_config(source, pagerank)),
            EngineKind::Parallel => {
                let pool = WorkerPool::new(self.config.pool_config())?;
                Box::new(PageRankArrayStorageParallel::with_config(source, pool, pagerank))
            }
        };
        Ok(engine)
    }

    /// Compute ranks without touching the store
    pub fn compute<G: GraphSource + ?Sized>(
        &self,
        source: &G,
        label: &str,
        rel_type: &str,
    ) -> ServiceResult<Vec<RankEntry>> {
        let mut engine = self.create_engine(source)?;
        engine.compute_page_rank(label, rel_type, self.config.iterations)?;
        Ok(engine.ranked_nodes())
    }

    /// Compute ranks for the `label`/`rel_type` subgraph and write each one
    /// to the configured node property.
    pub fn page_rank(&self, label: &str, rel_type: &str, store: &mut GraphStore) -> ServiceResult<String> {
        let ranks = self.compute(&*store, label, rel_type)?;

        for entry in &ranks {
            store.set_node_property(
                NodeId::new(entry.id),
                self.config.write_property.as_str(),
                entry.pagerank,
            )?;
        }

        info!(
            "PageRank ({} engine, {} iterations) wrote {} ranks to '{}'",
            self.config.engine,
            self.config.iterations,
            ranks.len(),
            self.config.write_property
        );
        Ok(format!("PageRank for {} and {} Completed!", label, rel_type))
    }

    /// `{id, pagerank}` row of the first `label` node whose `key` equals
    /// `value`, if it has a written rank.
    pub fn lookup(
        &self,
        store: &GraphStore,
        label: &str,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> Option<RankEntry> {
        let node = store.find_node(&Label::new(label), key, &value.into())?;
        let pagerank = node.get_property(&self.config.write_property)?.as_float()?;
        Some(RankEntry {
            id: node.id.as_u64(),
            pagerank,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GraphStore {
        let mut store = GraphStore::new();
        let a = store.create_node("Person");
        let b = store.create_node("Person");
        let c = store.create_node("Person");
        store.set_node_property(a, "name", "A").unwrap();
        store.create_edge(a, b, "KNOWS").unwrap();
        store.create_edge(b, c, "KNOWS").unwrap();
        store.create_edge(c, a, "KNOWS").unwrap();
        store
    }

    #[test]
    fn test_page_rank_writes_property() {
        let mut store = triangle();
        let service = PageRankService::new(ServiceConfig::default()).unwrap();

        let status = service.page_rank("Person", "KNOWS", &mut store).unwrap();
        assert_eq!(status, "PageRank for Person and KNOWS Completed!");

        // Symmetric cycle: every node keeps rank 1
        let row = service.lookup(&store, "Person", "name", "A").unwrap();
        assert_eq!(row.id, 1);
        assert!((row.pagerank - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_entry_json_shape() {
        let entry = RankEntry { id: 3, pagerank: 0.5 };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"id":3,"pagerank":0.5}"#);

        let back: RankEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_lookup_without_rank() {
        let store = triangle();
        let service = PageRankService::new(ServiceConfig::default()).unwrap();
        assert!(service.lookup(&store, "Person", "name", "A").is_none());
        assert!(service.lookup(&store, "Person", "name", "Z").is_none());
    }

    #[test]
    fn test_every_engine_kind() {
        let store = triangle();
        for engine in [EngineKind::Array, EngineKind::Map, EngineKind::Parallel] {
            let config = ServiceConfig {
                engine,
                iterations: 3,
                ..ServiceConfig::default()
            };
            let service = PageRankService::new(config).unwrap();
            let ranks = service.compute(&store, "Person", "KNOWS").unwrap();
            assert_eq!(ranks.len(), 3);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ServiceConfig {
            damping_factor: 2.0,
            ..ServiceConfig::default()
        };
        assert!(matches!(
            PageRankService::new(config),
            Err(ServiceError::Config(ConfigError::Invalid(_)))
        ));
    }
}
