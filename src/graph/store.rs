//! In-memory graph storage
//!
//! Arena layout: node `n` lives at slot `n - 1`, edges likewise. Adjacency
//! lists and the label index keep insertion order, so enumeration is stable
//! across reads of an unchanged store.

use super::node::{Edge, Node};
use super::property::{PropertyMap, PropertyValue};
use super::types::{EdgeId, EdgeType, Label, NodeId};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory property graph
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Outgoing edges per node slot
    outgoing: Vec<Vec<EdgeId>>,
    /// Label index for fast lookups
    label_index: FxHashMap<Label, Vec<NodeId>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        let slot = usize::try_from(id.as_u64()).ok()?.checked_sub(1)?;
        (slot < self.nodes.len()).then_some(slot)
    }

    /// Create a node with a single label
    pub fn create_node(&mut self, label: impl Into<Label>) -> NodeId {
        self.create_node_with_properties(vec![label.into()], PropertyMap::new())
    }

    pub fn create_node_with_properties(&mut self, labels: Vec<Label>, properties: PropertyMap) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64 + 1);
        let mut node = Node {
            id,
            labels: Vec::with_capacity(labels.len()),
            properties,
        };
        for label in labels {
            if node.add_label(label.clone()) {
                self.label_index.entry(label).or_default().push(id);
            }
        }
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        id
    }

    pub fn add_label(&mut self, id: NodeId, label: impl Into<Label>) -> GraphResult<()> {
        let slot = self.slot(id).ok_or(GraphError::NodeNotFound(id))?;
        let label = label.into();
        if self.nodes[slot].add_label(label.clone()) {
            self.label_index.entry(label).or_default().push(id);
        }
        Ok(())
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.slot(id).map(|slot| &self.nodes[slot])
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slot(id).map(|slot| &mut self.nodes[slot])
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn set_node_property(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let node = self.get_node_mut(id).ok_or(GraphError::NodeNotFound(id))?;
        node.set_property(key, value);
        Ok(())
    }

    /// Create a directed edge; both endpoints must exist
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<EdgeId> {
        let slot = self.slot(source).ok_or(GraphError::InvalidEdgeSource(source))?;
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let id = EdgeId::new(self.edges.len() as u64 + 1);
        self.edges.push(Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
        });
        self.outgoing[slot].push(id);
        Ok(id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        let slot = usize::try_from(id.as_u64()).ok()?.checked_sub(1)?;
        self.edges.get(slot)
    }

    /// Outgoing edges of a node in creation order
    pub fn get_outgoing_edges(&self, id: NodeId) -> Vec<&Edge> {
        self.slot(id)
            .map(|slot| {
                self.outgoing[slot]
                    .iter()
                    .filter_map(|&edge| self.get_edge(edge))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes carrying `label` in the order the label was attached
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|&id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    /// First `label` node whose `key` property equals `value`
    pub fn find_node(&self, label: &Label, key: &str, value: &PropertyValue) -> Option<&Node> {
        self.get_nodes_by_label(label)
            .into_iter()
            .find(|node| node.get_property(key) == Some(value))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
