//! Embeddings over an OpenAI-compatible `/embeddings` endpoint.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use webqa_core::config::EmbeddingConfig;
use webqa_core::Embedder;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building HTTP client for embeddings")?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key(),
            dim: config.dim,
        })
    }

    // Only the text-embedding-3 family accepts a requested output size.
    fn requested_dimensions(&self) -> Option<usize> {
        self.model.starts_with("text-embedding-3").then_some(self.dim)
    }
}

impl Embedder for OpenAiEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("embedding response was empty"))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbedRequest { model: &self.model, input: texts, dimensions: self.requested_dimensions() };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response: EmbedResponse = request
            .send()
            .with_context(|| format!("POST {}", self.endpoint))?
            .error_for_status()?
            .json()
            .context("decoding embedding response")?;

        let mut data = response.data;
        if data.len() != texts.len() {
            bail!("asked for {} embeddings, got {}", texts.len(), data.len());
        }
        data.sort_by_key(|d| d.index);
        for d in &data {
            if d.embedding.len() != self.dim {
                bail!("model {} returned {} dimensions, configured for {}", self.model, d.embedding.len(), self.dim);
            }
        }
        debug!(count = data.len(), model = %self.model, "embedded batch");
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
