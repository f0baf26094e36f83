use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Absolute input ceiling applied by [`crate::truncate_and_chunk`]
pub const DEFAULT_MAX_INPUT_CHARS: usize = 100_000;

/// Target size window for emitted chunks, measured in characters.
///
/// `max_chars` is a hard ceiling. `min_chars` is a soft target: an undersized
/// chunk is only emitted when no better split exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPolicy {
    /// Soft lower bound
    pub min_chars: usize,

    /// Hard upper bound
    pub max_chars: usize,
}

impl ChunkPolicy {
    /// Create a policy without validating it
    #[must_use]
    pub const fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    /// Window used for plain page text
    #[must_use]
    pub const fn for_text() -> Self {
        Self::new(100, 1000)
    }

    /// Window used for reader-mode HTML blocks
    #[must_use]
    pub const fn for_html() -> Self {
        Self::new(3000, 5000)
    }

    /// Validate the window
    pub fn validate(&self) -> Result<()> {
        if self.min_chars > self.max_chars {
            return Err(ChunkerError::invalid_policy(self.min_chars, self.max_chars));
        }

        if self.max_chars == 0 {
            return Err(ChunkerError::invalid_config("max_chars must be > 0"));
        }

        Ok(())
    }
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self::for_text()
    }
}

/// Size window plus output cap for transcripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptPolicy {
    /// Soft lower bound, used when a segment falls back to text splitting
    pub min_chars: usize,

    /// Hard upper bound for unmerged chunks
    pub max_chars: usize,

    /// Maximum number of chunks returned
    pub max_chunks: usize,
}

impl TranscriptPolicy {
    /// Create a policy without validating it
    #[must_use]
    pub const fn new(min_chars: usize, max_chars: usize, max_chunks: usize) -> Self {
        Self {
            min_chars,
            max_chars,
            max_chunks,
        }
    }

    /// The size window part of this policy
    #[must_use]
    pub const fn window(&self) -> ChunkPolicy {
        ChunkPolicy::new(self.min_chars, self.max_chars)
    }

    /// Validate the window and the chunk cap
    pub fn validate(&self) -> Result<()> {
        self.window().validate()?;

        if self.max_chunks == 0 {
            return Err(ChunkerError::invalid_config("max_chunks must be > 0"));
        }

        Ok(())
    }
}

impl Default for TranscriptPolicy {
    fn default() -> Self {
        Self::new(100, 800, 50)
    }
}

/// Configuration for every chunking entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkerConfig {
    /// Window for [`crate::Chunker::split_text`]
    pub text: ChunkPolicy,

    /// Window and cap for [`crate::Chunker::split_transcript`]
    pub transcript: TranscriptPolicy,

    /// Window for [`crate::Chunker::split_html`]
    pub html: ChunkPolicy,

    /// Input ceiling for [`crate::Chunker::truncate_and_chunk`]
    pub max_input_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            text: ChunkPolicy::for_text(),
            transcript: TranscriptPolicy::default(),
            html: ChunkPolicy::for_html(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl ChunkerConfig {
    /// Create config sized for language model prompts (larger chunks)
    pub fn for_llm_context() -> Self {
        Self {
            text: ChunkPolicy::new(500, 4000),
            transcript: TranscriptPolicy::new(500, 2000, 50),
            ..Default::default()
        }
    }

    /// Create config sized for paginating a reader view (small pages)
    pub fn for_reader_view() -> Self {
        Self {
            text: ChunkPolicy::new(200, 1500),
            html: ChunkPolicy::new(1500, 3000),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.text.validate()?;
        self.transcript.validate()?;
        self.html.validate()?;

        if self.max_input_chars == 0 {
            return Err(ChunkerError::invalid_config(
                "max_input_chars must be > 0",
            ));
        }

        Ok(())
    }
}
