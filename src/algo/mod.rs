//! PageRank integration layer
//!
//! The engines live in the `graphrank-algorithms` crate and only see a
//! [`GraphSource`]. This module adapts [`GraphStore`] to that contract and
//! provides the service facade that writes results back onto nodes.

pub mod service;

use crate::graph::{EdgeType, GraphStore, Label, NodeId};
use graphrank_algorithms::{GraphSource, SourceError, SourceIter, SourceResult};

// Re-export engines
pub use graphrank_algorithms::{
    AdjacencyIndex, AlgoError, AlgoResult, PageRank, PageRankArrayStorage,
    PageRankArrayStorageParallel, PageRankConfig, PageRankMapStorage, PoolConfig, RankEntry,
    WorkerPool,
};
pub use service::{PageRankService, ServiceError};

impl GraphSource for GraphStore {
    fn nodes(&self, label: &str) -> SourceIter<'_> {
        let label = Label::new(label);
        Box::new(
            self.get_nodes_by_label(&label)
                .into_iter()
                .map(|node| SourceResult::Ok(node.id.as_u64())),
        )
    }

    fn out_edges(&self, node: u64, rel_type: &str) -> SourceIter<'_> {
        let id = NodeId::new(node);
        if !self.has_node(id) {
            return Box::new(std::iter::once(Err(SourceError::new(format!(
                "{} not found in graph store",
                id
            )))));
        }
        let edge_type = EdgeType::new(rel_type);
        Box::new(
            self.get_outgoing_edges(id)
                .into_iter()
                .filter(move |edge| edge.edge_type == edge_type)
                .map(|edge| SourceResult::Ok(edge.target.as_u64())),
        )
    }
}
