use tracing::debug;

use webqa_core::{Chunk, Embedder, Error, Result, SearchHit, VectorIndex};

/// Embeds a question and looks up its nearest chunks. Nothing is cached;
/// every call embeds the question again.
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex<Chunk>,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex<Chunk>) -> Self {
        Self { embedder, index }
    }

    /// The `k` most similar chunks, best first.
    pub fn retrieve(&self, question: &str, k: usize) -> Result<Vec<Chunk>> {
        Ok(self.retrieve_scored(question, k)?.into_iter().map(|hit| hit.payload).collect())
    }

    pub fn retrieve_scored(&self, question: &str, k: usize) -> Result<Vec<SearchHit<Chunk>>> {
        let query = self.embedder.embed(question).map_err(Error::Embedding)?;
        let hits = self.index.search(&query, k)?;
        debug!(k, hits = hits.len(), best = hits.first().map(|h| h.score), "retrieved chunks");
        Ok(hits)
    }
}
