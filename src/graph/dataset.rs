//! JSON dataset files
//!
//! ```json
//! {
//!   "nodes": [{"key": "tom", "labels": ["Person"], "properties": {"name": "Tom Hanks"}}],
//!   "edges": [{"from": "tom", "to": "meg", "type": "KNOWS"}]
//! }
//! ```

use super::property::{PropertyMap, PropertyValue};
use super::store::{GraphError, GraphStore};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate node key: {0}")]
    DuplicateKey(String),

    #[error("Edge references unknown node key: {0}")]
    UnknownKey(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetNode {
    pub key: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

/// Nodes and edges addressed by caller-chosen string keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Vec<DatasetNode>,
    #[serde(default)]
    pub edges: Vec<DatasetEdge>,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Create every node and edge in `store`; returns the key to id mapping
    pub fn load_into(&self, store: &mut GraphStore) -> Result<HashMap<String, NodeId>, DatasetError> {
        let mut ids = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if ids.contains_key(&node.key) {
                return Err(DatasetError::DuplicateKey(node.key.clone()));
            }
            let labels = node.labels.iter().map(|l| Label::new(l.as_str())).collect();
            let properties: PropertyMap = node
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), PropertyValue::from(v)))
                .collect();
            let id = store.create_node_with_properties(labels, properties);
            ids.insert(node.key.clone(), id);
        }

        for edge in &self.edges {
            let resolve = |key: &String| {
                ids.get(key)
                    .copied()
                    .ok_or_else(|| DatasetError::UnknownKey(key.clone()))
            };
            store.create_edge(resolve(&edge.from)?, resolve(&edge.to)?, edge.edge_type.as_str())?;
        }

        info!(
            "Loaded dataset: {} nodes, {} edges (store now holds {} nodes, {} edges)",
            self.nodes.len(),
            self.edges.len(),
            store.node_count(),
            store.edge_count()
        );
        Ok(ids)
    }
}
