use tracing::{debug, info};

use webqa_core::config::{Settings, DEFAULT_TOP_K};
use webqa_core::{
    build_chunker, AnswerGenerator, Chunk, Chunker, ChunkingConfig, Document, Embedder, Error, FixedWindowChunker,
    Loader, QaTurn, Result, VectorIndex,
};
use webqa_vector::MemoryIndex;

use crate::retriever::Retriever;

/// Lifecycle of a [`Pipeline`]. There is no way back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Indexed,
    Ready,
}

/// Chunk, embed and index one document, then answer questions about it.
///
/// Loader, embedder and answer generator are injected; the index defaults
/// to an in-memory [`MemoryIndex`].
pub struct Pipeline {
    loader: Box<dyn Loader>,
    embedder: Box<dyn Embedder>,
    generator: Box<dyn AnswerGenerator>,
    index: Box<dyn VectorIndex<Chunk>>,
    chunking: ChunkingConfig,
    k: usize,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(loader: Box<dyn Loader>, embedder: Box<dyn Embedder>, generator: Box<dyn AnswerGenerator>) -> Self {
        Self {
            loader,
            embedder,
            generator,
            index: Box::new(MemoryIndex::new()),
            chunking: ChunkingConfig::default(),
            k: DEFAULT_TOP_K,
            state: PipelineState::Uninitialized,
        }
    }

    /// Pipeline with chunking and `k` taken from validated settings.
    pub fn from_settings(
        settings: &Settings,
        loader: Box<dyn Loader>,
        embedder: Box<dyn Embedder>,
        generator: Box<dyn AnswerGenerator>,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self::new(loader, embedder, generator)
            .with_chunking(settings.chunking.clone())
            .with_top_k(settings.retrieval.k))
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_index(mut self, index: Box<dyn VectorIndex<Chunk>>) -> Self {
        self.index = index;
        self
    }

    pub fn state(&self) -> PipelineState { self.state }
    pub fn chunk_count(&self) -> usize { self.index.len() }
    pub fn top_k(&self) -> usize { self.k }
    pub fn chunking(&self) -> &ChunkingConfig { &self.chunking }

    pub fn retriever(&self) -> Retriever<'_> {
        Retriever::new(self.embedder.as_ref(), self.index.as_ref())
    }

    pub fn load(&self, locator: &str) -> Result<Document> {
        let document = self.loader.load(locator).map_err(Error::Load)?;
        info!(source = %document.source_id, chars = document.char_len(), "loaded document");
        Ok(document)
    }

    /// Load `locator` and rebuild the index with the configured chunking.
    pub fn ingest(&mut self, locator: &str) -> Result<usize> {
        let chunker = build_chunker(&self.chunking)?;
        let document = self.load(locator)?;
        self.build_with(&document, chunker.as_ref())
    }

    /// Rebuild the index from `document` using fixed windows.
    pub fn build(&mut self, document: &Document, chunk_size: usize, overlap: usize) -> Result<usize> {
        let chunker = FixedWindowChunker::new(chunk_size, overlap)?;
        self.build_with(document, &chunker)
    }

    pub fn build_with(&mut self, document: &Document, chunker: &dyn Chunker) -> Result<usize> {
        self.build_with_progress(document, chunker, |_, _| {})
    }

    /// Clear the index, then embed and insert every chunk in order.
    ///
    /// `progress(done, total)` runs after each insert. If embedding fails
    /// part way, the chunks inserted so far stay and the state is unchanged.
    pub fn build_with_progress<F>(&mut self, document: &Document, chunker: &dyn Chunker, mut progress: F) -> Result<usize>
    where
        F: FnMut(usize, usize),
    {
        self.index.clear();
        let chunks = chunker.split(document);
        let total = chunks.len();
        info!(source = %document.source_id, chunker = chunker.name(), chunks = total, "building index");

        for (done, chunk) in chunks.into_iter().enumerate() {
            let vector = self.embedder.embed(&chunk.text).map_err(Error::Embedding)?;
            self.index.insert(vector, chunk)?;
            progress(done + 1, total);
        }

        self.state = PipelineState::Indexed;
        info!(chunks = total, "index built");
        Ok(total)
    }

    pub fn ask(&mut self, question: &str) -> Result<String> {
        self.ask_turn(question).map(|turn| turn.answer)
    }

    /// Retrieve the top `k` chunks for `question` and hand them, joined by
    /// blank lines, to the answer generator.
    pub fn ask_turn(&mut self, question: &str) -> Result<QaTurn> {
        if self.state == PipelineState::Uninitialized {
            return Err(Error::NotReady);
        }
        let context = self.retriever().retrieve(question, self.k)?;
        let joined = join_context(&context);
        debug!(chunks = context.len(), chars = joined.len(), "generating answer");
        let answer = self.generator.generate(question, &joined).map_err(Error::Generation)?;

        if self.state == PipelineState::Indexed {
            self.state = PipelineState::Ready;
        }
        info!(question, answer_chars = answer.len(), "answered");
        Ok(QaTurn::new(question, context, answer))
    }

    /// Answer `question`, first ingesting `source` when one is given.
    pub fn answer(&mut self, question: &str, source: Option<&str>) -> Result<QaTurn> {
        if let Some(locator) = source {
            self.ingest(locator)?;
        }
        self.ask_turn(question)
    }
}

pub fn join_context(chunks: &[Chunk]) -> String {
    chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n\n")
}
