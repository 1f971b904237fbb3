//! Embedder implementations.
//!
//! `build_embedder` picks one from configuration. Setting
//! `APP_USE_FAKE_EMBEDDINGS=1` forces the [`HashEmbedder`] regardless of the
//! configured provider, for fast deterministic runs.

use anyhow::Result;
use tracing::info;

use webqa_core::config::{EmbeddingConfig, EmbeddingProvider};
pub use webqa_core::config::use_fake_embeddings;
use webqa_core::Embedder;

mod hash;
mod openai;

#[cfg(feature = "bge")]
mod bge;
#[cfg(feature = "bge")]
mod device;
#[cfg(feature = "bge")]
mod pool;
#[cfg(feature = "bge")]
mod tokenize;

pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;

#[cfg(feature = "bge")]
pub use bge::{resolve_model_dir, BgeM3Embedder, BGE_M3_DIM};
#[cfg(feature = "bge")]
pub use pool::masked_mean_l2;

pub fn build_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() {
        info!(dim = config.dim, "using hash embedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Box::new(HashEmbedder::new(config.dim)));
    }
    match config.provider {
        EmbeddingProvider::Hash => {
            info!(dim = config.dim, "using hash embedder");
            Ok(Box::new(HashEmbedder::new(config.dim)))
        }
        EmbeddingProvider::OpenAi => {
            info!(model = %config.model, base_url = %config.base_url, "using OpenAI-compatible embedder");
            Ok(Box::new(OpenAiEmbedder::new(config)?))
        }
        EmbeddingProvider::Bge => build_bge(config),
    }
}

#[cfg(feature = "bge")]
fn build_bge(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    let dir = resolve_model_dir(config.model_dir())?;
    Ok(Box::new(BgeM3Embedder::new(&dir)?))
}

#[cfg(not(feature = "bge"))]
fn build_bge(_config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    anyhow::bail!("embedding.provider = \"bge\" needs webqa-embed built with the `bge` feature")
}
