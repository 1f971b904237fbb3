use crate::error::Result;
use crate::types::{Document, SearchHit};

/// Maps text to a fixed-length vector.
///
/// Implementations must return the same vector for the same input within a
/// process, otherwise retrieval stops being reproducible.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Produces the single document a pipeline answers questions about.
pub trait Loader: Send + Sync {
    fn load(&self, locator: &str) -> anyhow::Result<Document>;
}

/// Turns a question plus retrieved context into an answer.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, question: &str, context: &str) -> anyhow::Result<String>;
}

/// Nearest-neighbour store over `(id, vector, payload)` entries.
///
/// Ids are assigned by the index, start at 0 and strictly increase.
/// `search` returns at most `k` hits, best first; equal scores keep
/// insertion order.
pub trait VectorIndex<P>: Send + Sync {
    fn insert(&self, vector: Vec<f32>, payload: P) -> Result<u64>;
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<P>>>;
    fn len(&self) -> usize;
    fn clear(&self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
