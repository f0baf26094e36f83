//! # Webclip Chunker
//!
//! Size-bounded chunking of clipped web content for language model prompts,
//! citation and reader views.
//!
//! ## Philosophy
//!
//! Chunks are cut where a reader would cut them:
//! - Blank lines first, then sentence ends, then words, characters last
//! - Markdown links stay whole
//! - Transcript chunks keep the timestamp they were spoken at
//! - HTML chunks are balanced fragments, split between sections
//!
//! ## Architecture
//!
//! ```text
//! Input
//!     │
//!     ├──> Size Governor (truncate_and_chunk)
//!     │    └─> cut to max_input_chars ──┐
//!     │                                 ▼
//!     ├──> Text Boundary Splitter (split_text)
//!     │    └─> Paragraph → Sentence → Link segment → Word → Character
//!     │
//!     ├──> Timestamp Segmenter (split_transcript)
//!     │    ├─> partition at [MM:SS] markers
//!     │    ├─> fold equal timestamps, oversized segments → text splitter
//!     │    └─> merge groups down to max_chunks
//!     │
//!     └──> HTML Structural Splitter (split_html)
//!          ├─> parse with HTML5 recovery
//!          ├─> h1-h3 sections, else top-level elements
//!          └─> re-wrap oversized elements in their own tags
//!
//! Every chunk → Citation Tagger (IdGenerator)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use webclip_chunker::{ChunkPolicy, split_text, split_transcript};
//!
//! let chunks = split_text("Short.", None).unwrap();
//! assert_eq!(chunks[0].text, "Short.");
//!
//! let page = format!("{}\n\n{}", "a".repeat(600), "b".repeat(600));
//! let chunks = split_text(&page, Some(ChunkPolicy::new(100, 1000))).unwrap();
//! assert_eq!(chunks.len(), 2);
//!
//! let timed = split_transcript("[00:10] Hello [00:10] world [00:45] Next", None).unwrap();
//! assert_eq!(timed[0].text, "Hello\nworld");
//! assert_eq!(timed[0].timestamp_seconds, Some(10));
//! ```

mod boundary;
mod chunker;
mod citation;
mod config;
mod error;
mod governor;
pub mod html;
mod text;
mod transcript;
mod types;

pub use boundary::BoundaryLevel;
pub use chunker::{Chunker, ChunkingStats};
pub use citation::{IdGenerator, SequentialIds, UuidIds};
pub use config::{ChunkPolicy, ChunkerConfig, TranscriptPolicy, DEFAULT_MAX_INPUT_CHARS};
pub use error::{ChunkerError, Result};
pub use types::{Chunk, HtmlChunk, TruncatedChunks};

/// Cut `text` to [`DEFAULT_MAX_INPUT_CHARS`] characters and split it.
///
/// Uses [`ChunkPolicy::for_text`] when no policy is given.
pub fn truncate_and_chunk(text: &str, policy: Option<ChunkPolicy>) -> Result<TruncatedChunks> {
    governor::truncate_and_chunk(
        text,
        &policy.unwrap_or_default(),
        DEFAULT_MAX_INPUT_CHARS,
        &UuidIds,
    )
}

/// Split plain text at the coarsest boundary that fits.
///
/// Text of at most `max_chars` characters comes back verbatim as one chunk,
/// except empty or whitespace-only text, which yields no chunks.
///
/// Uses [`ChunkPolicy::for_text`] when no policy is given.
pub fn split_text(text: &str, policy: Option<ChunkPolicy>) -> Result<Vec<Chunk>> {
    text::split_text(text, &policy.unwrap_or_default(), &UuidIds)
}

/// Split a transcript with inline `[MM:SS]` / `(HH:MM:SS)` markers.
pub fn split_transcript(text: &str, policy: Option<TranscriptPolicy>) -> Result<Vec<Chunk>> {
    transcript::split_transcript(text, &policy.unwrap_or_default(), &UuidIds)
}

/// Split serialized HTML into balanced fragments.
///
/// Uses [`ChunkPolicy::for_html`] when no policy is given.
pub fn split_html(html: &str, policy: Option<ChunkPolicy>) -> Result<Vec<HtmlChunk>> {
    html::split_html(html, &policy.unwrap_or_else(ChunkPolicy::for_html), &UuidIds)
}
