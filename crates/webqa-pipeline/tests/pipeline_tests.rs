use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::bail;
use webqa_core::config::Settings;
use webqa_core::{AnswerGenerator, Document, Embedder, Error, Loader, RecursiveChunker};
use webqa_embed::HashEmbedder;
use webqa_pipeline::{join_context, Pipeline, PipelineState, DEFAULT_TOP_K};

const PAGE: &str = "Task decomposition splits a goal into smaller steps.\n\n\
Memory streams record observations over time.\n\n\
Tool use lets agents call external APIs.\n\n\
Reflection helps agents learn from mistakes.";

struct StubLoader(String);

impl Loader for StubLoader {
    fn load(&self, locator: &str) -> anyhow::Result<Document> {
        Ok(Document::new(locator, self.0.clone()))
    }
}

struct MissingLoader;

impl Loader for MissingLoader {
    fn load(&self, locator: &str) -> anyhow::Result<Document> {
        bail!("no such source: {locator}")
    }
}

/// Hash embeddings until `budget` calls have been made, then errors.
struct FlakyEmbedder {
    inner: HashEmbedder,
    calls: Arc<AtomicUsize>,
    budget: usize,
}

impl Embedder for FlakyEmbedder {
    fn dim(&self) -> usize { self.inner.dim() }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.budget {
            bail!("embedding service unavailable");
        }
        self.inner.embed(text)
    }
}

/// Answers with the context it was given.
struct EchoGenerator;

impl AnswerGenerator for EchoGenerator {
    fn generate(&self, _question: &str, context: &str) -> anyhow::Result<String> {
        Ok(context.to_string())
    }
}

struct BrokenGenerator;

impl AnswerGenerator for BrokenGenerator {
    fn generate(&self, _question: &str, _context: &str) -> anyhow::Result<String> {
        bail!("model overloaded")
    }
}

fn pipeline() -> Pipeline {
    Pipeline::new(Box::new(StubLoader(PAGE.to_string())), Box::new(HashEmbedder::new(256)), Box::new(EchoGenerator))
}

fn page() -> Document {
    Document::new("https://example.test/agents", PAGE)
}

#[test]
fn asking_before_build_is_not_ready() {
    let mut p = pipeline();
    assert_eq!(p.state(), PipelineState::Uninitialized);
    assert!(matches!(p.ask("anything?"), Err(Error::NotReady)));
    assert!(matches!(p.answer("anything?", None), Err(Error::NotReady)));
    assert_eq!(p.state(), PipelineState::Uninitialized);
}

#[test]
fn build_then_ask_moves_through_states() {
    let mut p = pipeline();
    let count = p.build(&page(), 60, 10).expect("build");
    assert!(count > 1);
    assert_eq!(p.chunk_count(), count);
    assert_eq!(p.state(), PipelineState::Indexed);

    let turn = p.ask_turn("What is task decomposition?").expect("ask");
    assert_eq!(p.state(), PipelineState::Ready);
    assert_eq!(turn.question, "What is task decomposition?");
    assert_eq!(turn.context.len(), DEFAULT_TOP_K.min(count));
    assert_eq!(turn.answer, join_context(&turn.context));

    p.build(&page(), 60, 10).expect("rebuild");
    assert_eq!(p.state(), PipelineState::Indexed, "rebuild returns to Indexed");
}

#[test]
fn long_document_builds_four_chunks() {
    let mut p = pipeline();
    let doc = Document::new("a.txt", "A".repeat(2500));
    assert_eq!(p.build(&doc, 1000, 200).expect("build"), 4);
    assert_eq!(p.chunk_count(), 4);
}

#[test]
fn context_is_joined_with_blank_lines() {
    let mut p = pipeline().with_top_k(10);
    p.build(&Document::new("words", "alpha beta gamma delta"), 6, 0).unwrap();
    let turn = p.ask_turn("beta").unwrap();
    assert_eq!(turn.context.len(), 4);
    let pieces: Vec<&str> = turn.answer.split("\n\n").collect();
    let texts: Vec<&str> = turn.context.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(pieces, texts);
}

#[test]
fn most_relevant_paragraph_comes_first() {
    let mut p = pipeline().with_top_k(1);
    p.build_with(&page(), &RecursiveChunker::new(60, 0).unwrap()).unwrap();
    let answer = p.ask("what is task decomposition").unwrap();
    assert!(answer.starts_with("Task decomposition"), "got {answer:?}");
}

#[test]
fn same_question_twice_gives_same_context() {
    let mut p = pipeline();
    p.build(&page(), 50, 10).unwrap();
    let first = p.ask_turn("how do agents use tools").unwrap();
    let second = p.ask_turn("how do agents use tools").unwrap();
    assert_eq!(first.context, second.context);
}

#[test]
fn rebuilding_is_idempotent() {
    let mut p = pipeline();
    p.build(&page(), 50, 10).unwrap();
    let before = p.retriever().retrieve_scored("memory", 3).unwrap();
    p.build(&page(), 50, 10).unwrap();
    let after = p.retriever().retrieve_scored("memory", 3).unwrap();
    assert_eq!(before, after);
    assert_eq!(before[0].id, after[0].id, "ids restart after a rebuild");
}

#[test]
fn embedding_failure_keeps_partial_index_and_state() {
    let calls = Arc::new(AtomicUsize::new(0));
    let embedder = FlakyEmbedder { inner: HashEmbedder::new(64), calls: Arc::clone(&calls), budget: 2 };
    let mut p = Pipeline::new(Box::new(StubLoader(String::new())), Box::new(embedder), Box::new(EchoGenerator));

    let err = p.build(&page(), 30, 5).unwrap_err();
    assert!(matches!(err, Error::Embedding(_)), "got {err:?}");
    assert_eq!(p.chunk_count(), 2);
    assert_eq!(p.state(), PipelineState::Uninitialized);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn question_embedding_failure_surfaces() {
    let calls = Arc::new(AtomicUsize::new(0));
    let embedder = FlakyEmbedder { inner: HashEmbedder::new(64), calls: Arc::clone(&calls), budget: 4 };
    let mut p = Pipeline::new(Box::new(StubLoader(String::new())), Box::new(embedder), Box::new(EchoGenerator));
    assert_eq!(p.build(&page(), 60, 10).unwrap(), 4);

    let err = p.ask("what is task decomposition").unwrap_err();
    assert!(matches!(err, Error::Embedding(_)), "got {err:?}");
    assert!(err.to_string().contains("embedding service unavailable"));
    assert_eq!(p.state(), PipelineState::Indexed);
    assert_eq!(p.chunk_count(), 4);
    assert!(matches!(p.retriever().retrieve("memory", 2), Err(Error::Embedding(_))));
}

#[test]
fn generator_failure_is_reported_once() {
    let mut p =
        Pipeline::new(Box::new(StubLoader(PAGE.to_string())), Box::new(HashEmbedder::new(64)), Box::new(BrokenGenerator));
    p.build(&page(), 60, 10).unwrap();
    let err = p.ask("anything").unwrap_err();
    assert!(matches!(err, Error::Generation(_)), "got {err:?}");
    assert_eq!(p.state(), PipelineState::Indexed);
}

#[test]
fn invalid_chunking_leaves_index_alone() {
    let mut p = pipeline();
    let count = p.build(&page(), 60, 10).unwrap();
    assert!(matches!(p.build(&page(), 10, 10), Err(Error::InvalidConfiguration(_))));
    assert_eq!(p.chunk_count(), count);
    assert_eq!(p.state(), PipelineState::Indexed);
}

#[test]
fn ingest_and_answer_use_the_loader() {
    let mut p = pipeline();
    let turn = p.answer("What do memory streams record?", Some("https://example.test/agents")).unwrap();
    assert_eq!(p.state(), PipelineState::Ready);
    assert!(turn.context.iter().all(|c| c.source_id == "https://example.test/agents"));

    let again = p.answer("What do memory streams record?", None).unwrap();
    assert_eq!(again.context, turn.context);
}

#[test]
fn load_failure_maps_to_load_error() {
    let mut p = Pipeline::new(Box::new(MissingLoader), Box::new(HashEmbedder::new(64)), Box::new(EchoGenerator));
    let err = p.ingest("nowhere.txt").unwrap_err();
    assert!(matches!(err, Error::Load(_)), "got {err:?}");
    assert!(err.to_string().contains("nowhere.txt"));
    assert_eq!(p.state(), PipelineState::Uninitialized);
}

#[test]
fn settings_drive_chunking_and_k() {
    let mut settings = Settings::default();
    settings.chunking.chunk_size = 40;
    settings.chunking.overlap = 0;
    settings.retrieval.k = 2;
    let mut p = Pipeline::from_settings(
        &settings,
        Box::new(StubLoader(PAGE.to_string())),
        Box::new(HashEmbedder::new(64)),
        Box::new(EchoGenerator),
    )
    .unwrap();
    assert_eq!(p.top_k(), 2);

    let count = p.ingest("page").unwrap();
    assert_eq!(count, PAGE.chars().count().div_ceil(40));
    assert_eq!(p.ask_turn("tools").unwrap().context.len(), 2);

    settings.retrieval.k = 0;
    let bad = Pipeline::from_settings(
        &settings,
        Box::new(StubLoader(String::new())),
        Box::new(HashEmbedder::new(64)),
        Box::new(EchoGenerator),
    );
    assert!(matches!(bad, Err(Error::InvalidConfiguration(_))));
}
