//! Domain types shared by the chunker, the vector index and the pipeline.

use serde::{Deserialize, Serialize};

pub type ChunkId = u64;

/// A loaded source document.
///
/// - `source_id`: where the text came from (URL or file path)
/// - `text`: the extracted plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub source_id: String,
    pub text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), text: text.into() }
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A contiguous piece of a [`Document`], the unit of retrieval.
///
/// `start_offset` counts characters from the start of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub start_offset: usize,
    pub source_id: String,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One entry returned by a vector index search.
///
/// `score` is cosine similarity; higher is always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit<P> {
    pub id: ChunkId,
    pub payload: P,
    pub score: f32,
}

/// A completed question/answer exchange.
///
/// Built once all three parts are known, so a `QaTurn` never carries a
/// question without its retrieved context and answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaTurn {
    pub question: String,
    pub context: Vec<Chunk>,
    pub answer: String,
}

impl QaTurn {
    pub fn new(question: impl Into<String>, context: Vec<Chunk>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), context, answer: answer.into() }
    }
}
