use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use webqa_core::config::SourceConfig;
use webqa_core::{Document, Loader};

use crate::html::extract_text;

const FETCH_TIMEOUT_SECS: u64 = 30;

/// Fetches a page over HTTP and keeps the text of the configured classes.
pub struct WebLoader {
    client: Client,
    class_filter: Vec<String>,
}

impl WebLoader {
    pub fn new(class_filter: Vec<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(concat!("webqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client for page fetches")?;
        Ok(Self { client, class_filter })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(config.class_filter.clone())
    }
}

impl Loader for WebLoader {
    fn load(&self, locator: &str) -> Result<Document> {
        let html = self
            .client
            .get(locator)
            .send()
            .with_context(|| format!("GET {locator}"))?
            .error_for_status()?
            .text()
            .with_context(|| format!("reading body of {locator}"))?;
        debug!(url = locator, bytes = html.len(), "fetched page");

        let text = extract_text(&html, &self.class_filter)?;
        if text.trim().is_empty() {
            warn!(url = locator, classes = ?self.class_filter, "page produced no text");
        }
        info!(url = locator, chars = text.chars().count(), "loaded page");
        Ok(Document::new(locator, text))
    }
}

/// Reads a local text file; invalid UTF-8 is replaced, not rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl Loader for FileLoader {
    fn load(&self, locator: &str) -> Result<Document> {
        let path = Path::new(locator);
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), "file is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Document::new(locator, text))
    }
}

/// `http://` and `https://` locators go to the web, anything else is a path.
pub struct SourceLoader {
    web: WebLoader,
    file: FileLoader,
}

impl SourceLoader {
    pub fn new(web: WebLoader) -> Self {
        Self { web, file: FileLoader }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self::new(WebLoader::from_config(config)?))
    }
}

impl Loader for SourceLoader {
    fn load(&self, locator: &str) -> Result<Document> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            self.web.load(locator)
        } else {
            self.file.load(locator)
        }
    }
}
