//! Collaborators that talk to the outside world: document loaders and the
//! chat-completion answer generator.

mod generator;
mod html;
mod loader;

pub use generator::{render_prompt, ChatGenerator, DEFAULT_PROMPT};
pub use html::extract_text;
pub use loader::{FileLoader, SourceLoader, WebLoader};
