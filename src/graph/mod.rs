//! Property graph store
//!
//! Nodes carry labels and properties; edges are directed and typed, and
//! several edges may join the same pair of nodes.

pub mod dataset;
pub mod node;
pub mod property;
pub mod store;
pub mod types;

pub use dataset::{Dataset, DatasetError};
pub use node::{Edge, Node};
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, EdgeType, Label, NodeId};
