//! Retrieval and question answering over one indexed document.

mod controller;
mod retriever;

pub use controller::{join_context, Pipeline, PipelineState};
pub use retriever::Retriever;
pub use webqa_core::config::DEFAULT_TOP_K;
pub use webqa_core::QaTurn;
