use tracing::{debug, trace};

use webqa_core::{Error, Result};

use crate::search::norm;
use crate::{Entries, IndexedVector, MemoryIndex};

impl<P> MemoryIndex<P> {
    /// Append `vector` with its payload and return the assigned id.
    ///
    /// The first insert fixes the dimensionality; later vectors of another
    /// length are rejected with [`Error::DimensionMismatch`].
    pub fn insert(&self, vector: Vec<f32>, payload: P) -> Result<u64> {
        let mut entries = self.entries.write();
        match entries.dim {
            Some(expected) if expected != vector.len() => {
                return Err(Error::DimensionMismatch { expected, actual: vector.len() });
            }
            Some(_) => {}
            None => {
                debug!(dim = vector.len(), "index dimension fixed by first insert");
                entries.dim = Some(vector.len());
            }
        }
        let id = entries.next_id;
        entries.next_id += 1;
        let norm = norm(&vector);
        entries.items.push(IndexedVector { id, vector, payload, norm });
        trace!(id, "inserted vector");
        Ok(id)
    }

    /// Drop every entry. Ids start again from 0.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        if !entries.items.is_empty() {
            debug!(dropped = entries.items.len(), "clearing index");
        }
        *entries = Entries::default();
    }
}
