use serde::{Deserialize, Serialize};

/// A bounded piece of plain text tagged with a citation id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Opaque id consumers use to refer back to this chunk
    pub citation_id: String,

    /// The chunk content
    pub text: String,

    /// Transcript position in seconds, when the text came from a timed segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_seconds: Option<u64>,
}

impl Chunk {
    /// Create an untimed chunk
    #[must_use]
    pub const fn new(citation_id: String, text: String) -> Self {
        Self {
            citation_id,
            text,
            timestamp_seconds: None,
        }
    }

    /// Create a chunk anchored at a transcript position
    #[must_use]
    pub const fn timed(citation_id: String, text: String, timestamp_seconds: Option<u64>) -> Self {
        Self {
            citation_id,
            text,
            timestamp_seconds,
        }
    }

    /// Length of the text in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A balanced HTML fragment keyed by id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HtmlChunk {
    /// Opaque id used by editors to address the block
    pub id: String,

    /// Serialized markup, every opened tag closed
    pub html: String,
}

impl HtmlChunk {
    #[must_use]
    pub const fn new(id: String, html: String) -> Self {
        Self { id, html }
    }

    /// Length of the markup in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.html.chars().count()
    }
}

/// Output of the size governor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TruncatedChunks {
    pub chunks: Vec<Chunk>,

    /// Whether the input was cut before chunking
    pub truncated: bool,
}
