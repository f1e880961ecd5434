//! Graphrank
//!
//! PageRank centrality over the nodes of a labelled property graph.
//!
//! # Architecture
//!
//! - [`graph`]: in-memory property graph store (nodes with labels and
//!   properties, directed typed edges) and JSON dataset loading
//! - [`algo`]: adapts the store to the `graphrank-algorithms` engines and
//!   provides [`PageRankService`], which writes ranks back onto nodes
//! - [`config`]: YAML service configuration
//!
//! The engines themselves (dense adjacency index, array and map rank
//! storage, serial and worker-pool execution) live in the
//! `graphrank-algorithms` crate.
//!
//! ## Example Usage
//!
//! ```rust
//! use graphrank::{GraphStore, PageRankService, ServiceConfig};
//!
//! let mut store = GraphStore::new();
//! let alice = store.create_node("Person");
//! let bob = store.create_node("Person");
//! store.set_node_property(alice, "name", "Alice").unwrap();
//! store.create_edge(alice, bob, "KNOWS").unwrap();
//! store.create_edge(bob, alice, "KNOWS").unwrap();
//!
//! let service = PageRankService::new(ServiceConfig::default()).unwrap();
//! let status = service.page_rank("Person", "KNOWS", &mut store).unwrap();
//! assert_eq!(status, "PageRank for Person and KNOWS Completed!");
//!
//! let row = service.lookup(&store, "Person", "name", "Alice").unwrap();
//! assert!((row.pagerank - 1.0).abs() < 1e-9);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod graph;

// Re-export main types for convenience
pub use graph::{
    Dataset, DatasetError, Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStore, Label,
    Node, NodeId, PropertyMap, PropertyValue,
};

pub use algo::{PageRankService, ServiceError};
pub use config::{ConfigError, EngineKind, ServiceConfig};

pub use graphrank_algorithms::{
    AlgoError, PageRank, PageRankArrayStorage, PageRankArrayStorageParallel, PageRankConfig,
    PageRankMapStorage, RankEntry, WorkerPool,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}
