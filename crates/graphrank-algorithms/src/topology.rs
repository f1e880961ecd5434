//! What the power iteration reads from the graph
//!
//! [`AdjacencyIndex`] answers from its precomputed CSR arrays using dense keys.
//! [`SourceTopology`] keeps native keys and asks the [`GraphSource`] on every
//! access, skipping index construction.

use crate::common::AdjacencyIndex;
use crate::error::{AlgoError, AlgoResult};
use crate::source::{GraphSource, NodeId};
use rustc_hash::FxHashSet;

/// Read-only graph shape addressed by rank-store keys
pub trait Topology {
    fn node_count(&self) -> usize;

    /// Key of the node at `position` in `0..node_count`
    fn node_key(&self, position: usize) -> u64;

    fn contains(&self, key: u64) -> bool;

    /// True when keys are exactly `0..node_count`
    fn is_dense(&self) -> bool;

    /// Call `visit` with each out-neighbor key of `key`, once per edge
    fn for_each_target(&self, key: u64, visit: &mut dyn FnMut(u64)) -> AlgoResult<()>;
}

impl Topology for AdjacencyIndex {
    fn node_count(&self) -> usize {
        AdjacencyIndex::node_count(self)
    }

    fn node_key(&self, position: usize) -> u64 {
        position as u64
    }

    fn contains(&self, key: u64) -> bool {
        key < AdjacencyIndex::node_count(self) as u64
    }

    fn is_dense(&self) -> bool {
        true
    }

    fn for_each_target(&self, key: u64, visit: &mut dyn FnMut(u64)) -> AlgoResult<()> {
        for &target in self.successors(key as usize) {
            visit(target as u64);
        }
        Ok(())
    }
}

/// Native-id topology that queries the source for adjacency on each access
pub struct SourceTopology<'g, G: GraphSource + ?Sized> {
    source: &'g G,
    rel_type: String,
    nodes: Vec<NodeId>,
    members: FxHashSet<NodeId>,
}

impl<'g, G: GraphSource + ?Sized> SourceTopology<'g, G> {
    /// Enumerate the `label` node set once; edges are read lazily.
    pub fn new(source: &'g G, label: &str, rel_type: &str) -> AlgoResult<Self> {
        let mut nodes = Vec::new();
        let mut members = FxHashSet::default();
        for native in source.nodes(label) {
            let native = native?;
            if members.insert(native) {
                nodes.push(native);
            }
        }

        Ok(Self {
            source,
            rel_type: rel_type.to_string(),
            nodes,
            members,
        })
    }

    fn member_targets(&self, key: u64) -> impl Iterator<Item = AlgoResult<u64>> + '_ {
        self.source
            .out_edges(key, &self.rel_type)
            .filter_map(move |target| match target {
                Ok(target) if self.members.contains(&target) => Some(Ok(target)),
                Ok(_) => None,
                Err(e) => Some(Err(AlgoError::from(e))),
            })
    }
}

impl<G: GraphSource + ?Sized> Topology for SourceTopology<'_, G> {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node_key(&self, position: usize) -> u64 {
        self.nodes[position]
    }

    fn contains(&self, key: u64) -> bool {
        self.members.contains(&key)
    }

    fn is_dense(&self) -> bool {
        false
    }

    fn for_each_target(&self, key: u64, visit: &mut dyn FnMut(u64)) -> AlgoResult<()> {
        for target in self.member_targets(key) {
            visit(target?);
        }
        Ok(())
    }
}
