use std::cmp::Ordering;
use tracing::debug;

use webqa_core::{Error, Result, SearchHit};

use crate::MemoryIndex;

pub(crate) fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity; 0.0 when either vector has zero length or norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    cosine_with_norms(a, norm(a), b, norm(b))
}

fn cosine_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let score = dot / (norm_a * norm_b);
    if score.is_nan() { f32::MIN } else { score }
}

impl<P: Clone> MemoryIndex<P> {
    /// The `k` entries most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order. `k == 0` is an
    /// [`Error::InvalidArgument`]; an empty index yields no hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<P>>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".to_string()));
        }
        let entries = self.entries.read();
        let Some(dim) = entries.dim else {
            return Ok(Vec::new());
        };
        if query.len() != dim {
            return Err(Error::DimensionMismatch { expected: dim, actual: query.len() });
        }

        let query_norm = norm(query);
        let mut scored: Vec<(usize, f32)> = entries
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (pos, cosine_with_norms(query, query_norm, &item.vector, item.norm)))
            .collect();
        // items are stored in id order, so position breaks ties by id
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!(k, candidates = entries.items.len(), returned = scored.len(), "vector search");
        Ok(scored
            .into_iter()
            .map(|(pos, score)| {
                let item = &entries.items[pos];
                SearchHit { id: item.id, payload: item.payload.clone(), score }
            })
            .collect())
    }
}
