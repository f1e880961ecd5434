//! Read-only access to an external graph store
//!
//! Engines never talk to a database directly. They consume a [`GraphSource`],
//! which enumerates native node ids for a label and native out-edge targets
//! for a relationship type.

use crate::error::{SourceError, SourceResult};
use rustc_hash::FxHashMap;

/// Native node identifier as issued by the graph store (possibly sparse)
pub type NodeId = u64;

/// Lazy sequence of native ids. A failed enumeration surfaces as an `Err`
/// item; sources must not truncate silently.
pub type SourceIter<'a> = Box<dyn Iterator<Item = SourceResult<NodeId>> + 'a>;

/// Point-in-time, read-only view of a graph store
pub trait GraphSource {
    /// Native ids of every node carrying `label`, in a stable order.
    fn nodes(&self, label: &str) -> SourceIter<'_>;

    /// Native target ids of every `rel_type` edge leaving `node`.
    /// Multi-edges yield the target once per edge.
    fn out_edges(&self, node: NodeId, rel_type: &str) -> SourceIter<'_>;
}

impl<G: GraphSource + ?Sized> GraphSource for &G {
    fn nodes(&self, label: &str) -> SourceIter<'_> {
        (**self).nodes(label)
    }

    fn out_edges(&self, node: NodeId, rel_type: &str) -> SourceIter<'_> {
        (**self).out_edges(node, rel_type)
    }
}

#[derive(Debug, Clone, Default)]
struct SourceNode {
    id: NodeId,
    labels: Vec<String>,
    edges: Vec<(String, NodeId)>,
}

/// Self-contained in-memory graph source built from labelled nodes and typed
/// edges. Node enumeration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct EdgeListSource {
    nodes: Vec<SourceNode>,
    positions: FxHashMap<NodeId, usize>,
}

impl EdgeListSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or attach another label to an existing one.
    pub fn add_node(&mut self, id: NodeId, label: &str) -> &mut Self {
        let position = match self.positions.get(&id) {
            Some(&position) => position,
            None => {
                self.nodes.push(SourceNode {
                    id,
                    ..SourceNode::default()
                });
                self.positions.insert(id, self.nodes.len() - 1);
                self.nodes.len() - 1
            }
        };
        let labels = &mut self.nodes[position].labels;
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
        self
    }

    /// Add a directed edge. Both endpoints must already exist.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, rel_type: &str) -> SourceResult<&mut Self> {
        if !self.positions.contains_key(&to) {
            return Err(SourceError::new(format!("unknown edge target {}", to)));
        }
        let position = *self
            .positions
            .get(&from)
            .ok_or_else(|| SourceError::new(format!("unknown edge source {}", from)))?;
        self.nodes[position].edges.push((rel_type.to_string(), to));
        Ok(self)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }
}

impl GraphSource for EdgeListSource {
    fn nodes(&self, label: &str) -> SourceIter<'_> {
        let label = label.to_string();
        Box::new(
            self.nodes
                .iter()
                .filter(move |n| n.labels.iter().any(|l| *l == label))
                .map(|n| SourceResult::Ok(n.id)),
        )
    }

    fn out_edges(&self, node: NodeId, rel_type: &str) -> SourceIter<'_> {
        let Some(&position) = self.positions.get(&node) else {
            return Box::new(std::iter::once(Err(SourceError::new(format!(
                "node {} vanished from source",
                node
            )))));
        };
        let rel_type = rel_type.to_string();
        Box::new(
            self.nodes[position]
                .edges
                .iter()
                .filter(move |(t, _)| *t == rel_type)
                .map(|&(_, target)| SourceResult::Ok(target)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(iter: SourceIter<'_>) -> SourceResult<Vec<NodeId>> {
        iter.collect()
    }

    #[test]
    fn test_nodes_filtered_by_label_in_insertion_order() {
        let mut source = EdgeListSource::new();
        source.add_node(30, "Person");
        source.add_node(10, "Movie");
        source.add_node(20, "Person");
        source.add_node(10, "Person");

        assert_eq!(collect(source.nodes("Person")).unwrap(), vec![30, 10, 20]);
        assert_eq!(collect(source.nodes("Movie")).unwrap(), vec![10]);
        assert!(collect(source.nodes("Robot")).unwrap().is_empty());
    }

    #[test]
    fn test_out_edges_filtered_by_type() {
        let mut source = EdgeListSource::new();
        source.add_node(1, "Person").add_node(2, "Person").add_node(3, "Movie");
        source.add_edge(1, 2, "KNOWS").unwrap();
        source.add_edge(1, 2, "KNOWS").unwrap();
        source.add_edge(1, 3, "ACTED_IN").unwrap();

        assert_eq!(collect(source.out_edges(1, "KNOWS")).unwrap(), vec![2, 2]);
        assert_eq!(collect(source.out_edges(1, "ACTED_IN")).unwrap(), vec![3]);
        assert_eq!(source.edge_count(), 3);
    }

    #[test]
    fn test_unknown_node_surfaces_error() {
        let source = EdgeListSource::new();
        assert!(collect(source.out_edges(7, "KNOWS")).is_err());
    }

    #[test]
    fn test_edge_requires_endpoints() {
        let mut source = EdgeListSource::new();
        source.add_node(1, "Person");
        assert!(source.add_edge(1, 2, "KNOWS").is_err());
        assert!(source.add_edge(2, 1, "KNOWS").is_err());
    }
}
