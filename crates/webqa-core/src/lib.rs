#![deny(unused_variables)]

//! Core of the question-answering pipeline: domain types, the error
//! taxonomy, collaborator traits, chunking and configuration.

pub mod chunker;
pub mod config;
pub mod error;
pub mod recursive;
pub mod traits;
pub mod types;

pub use chunker::{build_chunker, split, Chunker, ChunkerKind, ChunkingConfig, FixedWindowChunker};
pub use error::{Error, Result};
pub use recursive::RecursiveChunker;
pub use traits::{AnswerGenerator, Embedder, Loader, VectorIndex};
pub use types::{Chunk, ChunkId, Document, QaTurn, SearchHit};
