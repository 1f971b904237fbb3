//! Separator-aware splitting.
//!
//! Text is cut on the coarsest separator that occurs in it (blank line,
//! newline, space, then single characters). Pieces that are still too long
//! are cut again with the finer separators, then neighbouring pieces are
//! merged back up to `chunk_size`. Separators stay attached to the piece
//! they end, so every chunk is an exact substring of the document.

use std::collections::VecDeque;

use crate::chunker::{validate, Chunker};
use crate::error::Result;
use crate::types::{Chunk, Document};

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    chars: usize,
}

#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate(chunk_size, overlap)?;
        Ok(Self { chunk_size, overlap, separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect() })
    }

    /// Replace the separator list. An empty string means "split into characters"
    /// and is appended when missing so oversized pieces can always be cut.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        if !self.separators.iter().any(String::is_empty) {
            self.separators.push(String::new());
        }
        self
    }

    fn split_spans(&self, text: &str, base: usize, separators: &[String], out: &mut Vec<Span>) {
        let Some(idx) = separators.iter().position(|s| s.is_empty() || text.contains(s.as_str())) else {
            return;
        };
        let finer = &separators[idx + 1..];
        let mut good: Vec<Span> = Vec::new();
        for piece in pieces(text, base, &separators[idx]) {
            if piece.chars <= self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                self.merge(&good, out);
                good.clear();
            }
            self.split_spans(&text[piece.start - base..piece.end - base], piece.start, finer, out);
        }
        if !good.is_empty() {
            self.merge(&good, out);
        }
    }

    /// Greedily pack contiguous pieces into spans of at most `chunk_size`
    /// characters, carrying up to `overlap` characters of trailing pieces
    /// into the next span.
    fn merge(&self, pieces: &[Span], out: &mut Vec<Span>) {
        let mut window: VecDeque<Span> = VecDeque::new();
        let mut total = 0usize;
        for piece in pieces {
            if total + piece.chars > self.chunk_size && !window.is_empty() {
                out.push(join(&window, total));
                while total > self.overlap || (total > 0 && total + piece.chars > self.chunk_size) {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.chars,
                        None => break,
                    }
                }
            }
            window.push_back(*piece);
            total += piece.chars;
        }
        if !window.is_empty() {
            out.push(join(&window, total));
        }
    }
}

impl Chunker for RecursiveChunker {
    fn name(&self) -> &str { "recursive" }

    fn split(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text.as_str();
        let mut spans = Vec::new();
        self.split_spans(text, 0, &self.separators, &mut spans);

        let mut chunks = Vec::with_capacity(spans.len());
        let (mut byte_cursor, mut char_cursor) = (0usize, 0usize);
        for span in spans {
            let slice = &text[span.start..span.end];
            if slice.trim().is_empty() {
                continue;
            }
            // spans come out in document order, so offsets can be counted incrementally
            if span.start >= byte_cursor {
                char_cursor += text[byte_cursor..span.start].chars().count();
            } else {
                char_cursor -= text[span.start..byte_cursor].chars().count();
            }
            byte_cursor = span.start;
            chunks.push(Chunk { text: slice.to_string(), start_offset: char_cursor, source_id: document.source_id.clone() });
        }
        chunks
    }
}

/// Cut `text` after every occurrence of `separator`.
///
/// The separator ends the piece before it, unlike LangChain's
/// `RecursiveCharacterTextSplitter`, which starts the next piece with it and
/// strips whitespace from each chunk. Keeping it on the left and never
/// stripping lets every chunk map back to the source by `start_offset`.
fn pieces(text: &str, base: usize, separator: &str) -> Vec<Span> {
    let mut out = Vec::new();
    if separator.is_empty() {
        for (i, c) in text.char_indices() {
            out.push(Span { start: base + i, end: base + i + c.len_utf8(), chars: 1 });
        }
        return out;
    }
    let mut start = 0;
    for part in text.split_inclusive(separator) {
        let end = start + part.len();
        out.push(Span { start: base + start, end: base + end, chars: part.chars().count() });
        start = end;
    }
    out
}

fn join(window: &VecDeque<Span>, chars: usize) -> Span {
    match (window.front(), window.back()) {
        (Some(first), Some(last)) => Span { start: first.start, end: last.end, chars },
        _ => Span { start: 0, end: 0, chars: 0 },
    }
}
