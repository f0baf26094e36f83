use crate::boundary::char_prefix;
use crate::citation::IdGenerator;
use crate::config::ChunkPolicy;
use crate::error::Result;
use crate::text::split_text;
use crate::types::TruncatedChunks;

/// Cut `text` to `max_input_chars` characters, then split it as plain text.
pub(crate) fn truncate_and_chunk(
    text: &str,
    policy: &ChunkPolicy,
    max_input_chars: usize,
    ids: &dyn IdGenerator,
) -> Result<TruncatedChunks> {
    policy.validate()?;

    let kept = char_prefix(text, max_input_chars);
    let truncated = kept.len() < text.len();
    if truncated {
        log::warn!(
            "Input truncated to {max_input_chars} chars before chunking ({} bytes dropped)",
            text.len() - kept.len()
        );
    }

    Ok(TruncatedChunks {
        chunks: split_text(kept, policy, ids)?,
        truncated,
    })
}
