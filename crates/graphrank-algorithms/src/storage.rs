//! Rank value storage
//!
//! The engines read and write ranks only through [`RankStore`]. Two layouts
//! exist: a contiguous array indexed by dense id, and a hash map keyed by any
//! (possibly sparse) id.

use rustc_hash::FxHashMap;

/// Capability contract over a vector of rank values
pub trait RankStore {
    /// Rank stored for `id`. Ids never written read as `0.0`.
    fn get(&self, id: u64) -> f64;
    fn set(&mut self, id: u64, value: f64);
    /// Number of ids this store holds a value for
    fn size(&self) -> usize;
}

/// Dense contiguous storage; ids must lie in `0..size`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayRankStore {
    values: Vec<f64>,
}

impl ArrayRankStore {
    pub fn new(size: usize) -> Self {
        Self::filled(size, 0.0)
    }

    pub fn filled(size: usize, value: f64) -> Self {
        ArrayRankStore {
            values: vec![value; size],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

impl RankStore for ArrayRankStore {
    fn get(&self, id: u64) -> f64 {
        self.values[id as usize]
    }

    fn set(&mut self, id: u64, value: f64) {
        self.values[id as usize] = value;
    }

    fn size(&self) -> usize {
        self.values.len()
    }
}

/// Keyed storage tolerant of sparse, non-contiguous id spaces
#[derive(Debug, Clone, Default)]
pub struct MapRankStore {
    values: FxHashMap<u64, f64>,
}

impl MapRankStore {
    pub fn with_capacity(capacity: usize) -> Self {
        MapRankStore {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }
}

impl RankStore for MapRankStore {
    fn get(&self, id: u64) -> f64 {
        self.values.get(&id).copied().unwrap_or(0.0)
    }

    fn set(&mut self, id: u64, value: f64) {
        self.values.insert(id, value);
    }

    fn size(&self) -> usize {
        self.values.len()
    }
}

/// Which storage layout an engine allocates its rank buffers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StorageKind {
    Array,
    Map,
}

/// A rank buffer whose layout was chosen at construction time
#[derive(Debug, Clone)]
pub enum RankStorage {
    Array(ArrayRankStore),
    Map(MapRankStore),
}

impl RankStorage {
    pub fn new(kind: StorageKind, capacity: usize) -> Self {
        match kind {
            StorageKind::Array => RankStorage::Array(ArrayRankStore::new(capacity)),
            StorageKind::Map => RankStorage::Map(MapRankStore::with_capacity(capacity)),
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            RankStorage::Array(_) => StorageKind::Array,
            RankStorage::Map(_) => StorageKind::Map,
        }
    }
}

impl RankStore for RankStorage {
    #[inline]
    fn get(&self, id: u64) -> f64 {
        match self {
            RankStorage::Array(store) => store.get(id),
            RankStorage::Map(store) => store.get(id),
        }
    }

    #[inline]
    fn set(&mut self, id: u64, value: f64) {
        match self {
            RankStorage::Array(store) => store.set(id, value),
            RankStorage::Map(store) => store.set(id, value),
        }
    }

    fn size(&self) -> usize {
        match self {
            RankStorage::Array(store) => store.size(),
            RankStorage::Map(store) => store.size(),
        }
    }
}
