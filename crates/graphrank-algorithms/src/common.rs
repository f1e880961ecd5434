//! Shared graph structures for rank computation
//!
//! Provides an immutable, dense-id view of the graph topology built once from
//! a [`GraphSource`] snapshot.

use crate::error::AlgoResult;
use crate::source::{GraphSource, NodeId};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// A dense, integer-indexed adjacency structure in Compressed Sparse Row (CSR) format.
///
/// Dense ids are assigned in source enumeration order and cover `0..node_count`.
/// The native id correspondence is only consulted at construction and when
/// results are read back.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    /// Number of nodes
    node_count: usize,
    /// Mapping from dense index (0..N) back to native NodeId
    index_to_node: Vec<NodeId>,
    /// Mapping from native NodeId to dense index
    node_to_index: FxHashMap<NodeId, usize>,
    /// Offsets into `out_targets`. Size = node_count + 1
    out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    out_targets: Vec<usize>,
    /// Dense ids with out-degree 0
    dangling: Vec<usize>,
}

impl AdjacencyIndex {
    /// Build the index from the `label` nodes of `source` and their `rel_type` out-edges.
    ///
    /// Edges leaving the label set are ignored. Any enumeration failure aborts
    /// the build and no index is returned.
    pub fn build<G: GraphSource + ?Sized>(
        source: &G,
        label: &str,
        rel_type: &str,
    ) -> AlgoResult<Self> {
        // 1. Assign dense ids in enumeration order
        let mut index_to_node = Vec::new();
        let mut node_to_index = FxHashMap::default();
        for native in source.nodes(label) {
            let native = native?;
            if node_to_index.contains_key(&native) {
                continue;
            }
            node_to_index.insert(native, index_to_node.len());
            index_to_node.push(native);
        }

        let node_count = index_to_node.len();

        // 2. Resolve out-edges through the correspondence table
        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut dangling = Vec::new();
        let mut dropped = 0usize;

        out_offsets.push(0);
        for (u_idx, &u_native) in index_to_node.iter().enumerate() {
            for target in source.out_edges(u_native, rel_type) {
                match node_to_index.get(&target?) {
                    Some(&v_idx) => out_targets.push(v_idx),
                    None => dropped += 1,
                }
            }
            if out_targets.len() == out_offsets[u_idx] {
                dangling.push(u_idx);
            }
            out_offsets.push(out_targets.len());
        }

        if dropped > 0 {
            debug!(
                "Ignored {} {} edges leaving the {} node set",
                dropped, rel_type, label
            );
        }
        info!(
            "Built adjacency index for {}/{}: {} nodes, {} edges, {} dangling",
            label,
            rel_type,
            node_count,
            out_targets.len(),
            dangling.len()
        );

        Ok(Self {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            dangling,
        })
    }

    /// Helper to create an index from dense adjacency lists (test and bench support)
    pub fn from_adjacency_list(index_to_node: Vec<NodeId>, outgoing: Vec<Vec<usize>>) -> Self {
        let node_count = index_to_node.len();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &native)| (native, idx))
            .collect();

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut dangling = Vec::new();

        out_offsets.push(0);
        for (i, neighbors) in outgoing.into_iter().enumerate().take(node_count) {
            out_targets.extend(neighbors.into_iter().filter(|&v| v < node_count));
            if out_targets.len() == out_offsets[i] {
                dangling.push(i);
            }
            out_offsets.push(out_targets.len());
        }
        while out_offsets.len() < node_count + 1 {
            dangling.push(out_offsets.len() - 1);
            out_offsets.push(out_targets.len());
        }

        Self {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            dangling,
        }
    }

    /// Number of nodes in the dense id space
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of edges kept after label filtering
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Dense ids with no outgoing edges
    pub fn dangling(&self) -> &[usize] {
        &self.dangling
    }

    pub fn is_dangling(&self, idx: usize) -> bool {
        self.out_degree(idx) == 0
    }

    /// Resolve a native id to its dense index
    pub fn dense_id(&self, native: NodeId) -> Option<usize> {
        self.node_to_index.get(&native).copied()
    }

    /// Resolve a dense index back to the native id
    pub fn native_id(&self, idx: usize) -> Option<NodeId> {
        self.index_to_node.get(idx).copied()
    }
}
