use crate::citation::{IdGenerator, UuidIds};
use crate::config::{ChunkPolicy, ChunkerConfig, TranscriptPolicy};
use crate::error::Result;
use crate::types::{Chunk, HtmlChunk, TruncatedChunks};
use crate::{governor, html, text, transcript};
use std::sync::Arc;

/// Main chunker interface: one configuration, one id source, every splitter
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    ids: Arc<dyn IdGenerator>,
}

impl Chunker {
    /// Create a new chunker with configuration, tagging chunks with UUIDs
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ids: Arc::new(UuidIds),
        })
    }

    /// Replace the citation id source
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split plain text with the configured text window
    pub fn split_text(&self, content: &str) -> Result<Vec<Chunk>> {
        self.split_text_with(content, &self.config.text)
    }

    /// Split plain text with an explicit window
    pub fn split_text_with(&self, content: &str, policy: &ChunkPolicy) -> Result<Vec<Chunk>> {
        text::split_text(content, policy, self.ids.as_ref())
    }

    /// Split a timestamped transcript with the configured transcript policy
    pub fn split_transcript(&self, content: &str) -> Result<Vec<Chunk>> {
        self.split_transcript_with(content, &self.config.transcript)
    }

    pub fn split_transcript_with(
        &self,
        content: &str,
        policy: &TranscriptPolicy,
    ) -> Result<Vec<Chunk>> {
        transcript::split_transcript(content, policy, self.ids.as_ref())
    }

    /// Split an HTML fragment with the configured HTML window
    pub fn split_html(&self, content: &str) -> Result<Vec<HtmlChunk>> {
        self.split_html_with(content, &self.config.html)
    }

    pub fn split_html_with(&self, content: &str, policy: &ChunkPolicy) -> Result<Vec<HtmlChunk>> {
        html::split_html(content, policy, self.ids.as_ref())
    }

    /// Cut text to the configured input ceiling, then split it
    pub fn truncate_and_chunk(&self, content: &str) -> Result<TruncatedChunks> {
        self.truncate_and_chunk_with(content, &self.config.text)
    }

    pub fn truncate_and_chunk_with(
        &self,
        content: &str,
        policy: &ChunkPolicy,
    ) -> Result<TruncatedChunks> {
        let out = governor::truncate_and_chunk(
            content,
            policy,
            self.config.max_input_chars,
            self.ids.as_ref(),
        )?;
        log::debug!("{}", Self::get_stats(&out.chunks));
        Ok(out)
    }

    /// Get statistics about chunking
    #[must_use]
    pub fn get_stats(chunks: &[Chunk]) -> ChunkingStats {
        let lens = || chunks.iter().map(Chunk::char_len);
        let total_chars: usize = lens().sum();

        ChunkingStats {
            total_chunks: chunks.len(),
            total_chars,
            avg_chars: if chunks.is_empty() {
                0
            } else {
                total_chars / chunks.len()
            },
            min_chars: lens().min().unwrap_or(0),
            max_chars: lens().max().unwrap_or(0),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
            ids: Arc::new(UuidIds),
        }
    }
}

/// Statistics about chunking results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_chars: usize,
    pub avg_chars: usize,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Chars: {} | Avg: {} | Range: {}-{}",
            self.total_chunks, self.total_chars, self.avg_chars, self.min_chars, self.max_chars
        )
    }
}
