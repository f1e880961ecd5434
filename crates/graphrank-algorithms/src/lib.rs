pub mod common;
pub mod error;
pub mod pagerank;
pub mod parallel;
pub mod source;
pub mod storage;
pub mod topology;

pub use common::AdjacencyIndex;
pub use error::{AlgoError, AlgoResult, SourceError, SourceResult};
pub use pagerank::{
    PageRank, PageRankArrayStorage, PageRankConfig, PageRankMapStorage, RankEntry, SerialEngine,
    INITIAL_RANK,
};
pub use parallel::{partition_ranges, CancelToken, PageRankArrayStorageParallel, PoolConfig, WorkerPool};
pub use source::{EdgeListSource, GraphSource, NodeId, SourceIter};
pub use storage::{ArrayRankStore, MapRankStore, RankStorage, RankStore, StorageKind};
pub use topology::{SourceTopology, Topology};
