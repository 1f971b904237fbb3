//! In-memory vector index.
//!
//! Brute-force cosine similarity over every stored vector. Fine for a
//! single document's worth of chunks; anything bigger should implement
//! [`webqa_core::VectorIndex`] with a real ANN structure instead.

use parking_lot::RwLock;

use webqa_core::{Result, SearchHit, VectorIndex};

mod search;
mod writer;

pub use search::cosine_similarity;

/// One stored entry. The norm is computed once at insert time.
#[derive(Debug, Clone)]
pub struct IndexedVector<P> {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: P,
    pub(crate) norm: f32,
}

#[derive(Debug)]
pub(crate) struct Entries<P> {
    pub(crate) dim: Option<usize>,
    pub(crate) next_id: u64,
    pub(crate) items: Vec<IndexedVector<P>>,
}

impl<P> Default for Entries<P> {
    fn default() -> Self {
        Self { dim: None, next_id: 0, items: Vec::new() }
    }
}

/// Thread-safe in-memory index. Inserts take the write lock, searches the
/// read lock, so a search never observes a half-appended entry.
#[derive(Debug)]
pub struct MemoryIndex<P> {
    pub(crate) entries: RwLock<Entries<P>>,
}

impl<P> Default for MemoryIndex<P> {
    fn default() -> Self {
        Self { entries: RwLock::new(Entries::default()) }
    }
}

impl<P> MemoryIndex<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensionality fixed by the first insert, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.read().dim
    }

    pub fn len(&self) -> usize {
        self.entries.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: Clone + Send + Sync> VectorIndex<P> for MemoryIndex<P> {
    fn insert(&self, vector: Vec<f32>, payload: P) -> Result<u64> {
        MemoryIndex::insert(self, vector, payload)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<P>>> {
        MemoryIndex::search(self, query, k)
    }

    fn len(&self) -> usize {
        MemoryIndex::len(self)
    }

    fn clear(&self) {
        MemoryIndex::clear(self)
    }
}
