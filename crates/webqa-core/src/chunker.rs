//! Splitting a document into overlapping chunks.
//!
//! Sizes and offsets are measured in characters, never bytes, so a chunk
//! boundary can not fall inside a multi-byte code point.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::recursive::RecursiveChunker;
use crate::types::{Chunk, Document};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkerKind {
    #[default]
    Fixed,
    Recursive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default)]
    pub strategy: ChunkerKind,
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { strategy: ChunkerKind::Fixed, chunk_size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        validate(self.chunk_size, self.overlap)
    }
}

pub trait Chunker: Send + Sync {
    fn name(&self) -> &str;
    fn split(&self, document: &Document) -> Vec<Chunk>;
}

/// Sliding window of `chunk_size` characters advanced by
/// `chunk_size - overlap` until the window start leaves the text.
#[derive(Debug, Clone, Copy)]
pub struct FixedWindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedWindowChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate(chunk_size, overlap)?;
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn overlap(&self) -> usize { self.overlap }

    fn windows<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        // bounds[c] is the byte offset of character c; the extra last entry is text.len()
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let len = bounds.len() - 1;
        if len <= self.chunk_size {
            return vec![(0, text)];
        }
        let stride = self.chunk_size - self.overlap;
        let mut windows = Vec::with_capacity(len.div_ceil(stride));
        let mut start = 0;
        while start < len {
            let end = (start + self.chunk_size).min(len);
            windows.push((start, &text[bounds[start]..bounds[end]]));
            start += stride;
        }
        windows
    }
}

impl Chunker for FixedWindowChunker {
    fn name(&self) -> &str { "fixed" }

    fn split(&self, document: &Document) -> Vec<Chunk> {
        self.windows(&document.text)
            .into_iter()
            .map(|(start_offset, text)| Chunk { text: text.to_string(), start_offset, source_id: document.source_id.clone() })
            .collect()
    }
}

/// Split `document` with the fixed-window strategy.
pub fn split(document: &Document, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(FixedWindowChunker::new(chunk_size, overlap)?.split(document))
}

pub fn build_chunker(config: &ChunkingConfig) -> Result<Box<dyn Chunker>> {
    Ok(match config.strategy {
        ChunkerKind::Fixed => Box::new(FixedWindowChunker::new(config.chunk_size, config.overlap)?),
        ChunkerKind::Recursive => Box::new(RecursiveChunker::new(config.chunk_size, config.overlap)?),
    })
}

pub(crate) fn validate(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::InvalidConfiguration("chunk_size must be positive".to_string()));
    }
    if overlap >= chunk_size {
        return Err(Error::InvalidConfiguration(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}
