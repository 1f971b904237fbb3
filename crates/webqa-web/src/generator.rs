//! Answer generation over an OpenAI-compatible `/chat/completions` endpoint.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use webqa_core::config::GenerationConfig;
use webqa_core::AnswerGenerator;

/// Question-answering prompt; `{question}` and `{context}` are substituted.
pub const DEFAULT_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\
Question: {question} \n\
Context: {context} \n\
Answer:";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    prompt: String,
}

impl ChatGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building HTTP client for chat completions")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key(),
            temperature: config.temperature,
            prompt: config.prompt.clone().unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
        })
    }
}

impl AnswerGenerator for ChatGenerator {
    fn generate(&self, question: &str, context: &str) -> Result<String> {
        let content = render_prompt(&self.prompt, question, context);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Message { role: "user", content: &content }],
            temperature: self.temperature,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response: ChatResponse = request
            .send()
            .with_context(|| format!("POST {}", self.endpoint))?
            .error_for_status()?
            .json()
            .context("decoding chat completion")?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat completion had no message content"))?;
        debug!(model = %self.model, prompt_chars = content.len(), answer_chars = answer.len(), "generated answer");
        Ok(answer)
    }
}

/// Substitute `{question}` and `{context}` in one pass, so placeholder text
/// inside either value is left alone.
pub fn render_prompt(template: &str, question: &str, context: &str) -> String {
    let mut out = String::with_capacity(template.len() + question.len() + context.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{question}") {
            out.push_str(question);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(context);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_both_placeholders() {
        let out = render_prompt("Q: {question}\nC: {context}", "why?", "because");
        assert_eq!(out, "Q: why?\nC: because");
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = render_prompt("{question}|{context}", "{context}", "ctx {question}");
        assert_eq!(out, "{context}|ctx {question}");
    }

    #[test]
    fn other_braces_survive() {
        assert_eq!(render_prompt("{json} {context}", "q", "c"), "{json} c");
    }

    #[test]
    fn default_prompt_mentions_both() {
        let out = render_prompt(DEFAULT_PROMPT, "What is CoT?", "Chain of thought.");
        assert!(out.contains("Question: What is CoT?"));
        assert!(out.contains("Context: Chain of thought."));
        assert!(out.ends_with("Answer:"));
    }
}
