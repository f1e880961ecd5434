//! Error taxonomy for rank computation

use thiserror::Error;

/// Failure reported by a [`GraphSource`](crate::GraphSource) while enumerating
/// nodes or edges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        SourceError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while building an index or iterating ranks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgoError {
    /// Enumeration of nodes or edges failed; nothing was built.
    #[error("Graph source enumeration failed: {0}")]
    GraphSource(#[from] SourceError),

    #[error("Node {0} not found")]
    NodeNotFound(u64),

    /// More partition tasks than the bounded queue admits.
    #[error("Worker pool saturated: {submitted} tasks submitted, queue capacity is {capacity}")]
    PoolSaturation { submitted: usize, capacity: usize },

    #[error("Partition {partition} failed: {reason}")]
    PartitionFailed { partition: usize, reason: String },

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    PoolBuild(String),
}

pub type AlgoResult<T> = Result<T, AlgoError>;
