//! Structure-aware splitting of serialized HTML.
//!
//! Chunks follow heading sections when the fragment has `h1`..`h3` headings
//! at the top level, otherwise its top-level elements. Every chunk is
//! balanced markup: an element too large for one chunk is re-opened in each
//! piece with its original attributes.

mod splitter;
mod tree;

pub use tree::{parse_fragment, serialize_nodes, HtmlElement, HtmlNode};

use crate::boundary::char_len;
use crate::citation::IdGenerator;
use crate::config::ChunkPolicy;
use crate::error::Result;
use crate::types::HtmlChunk;
use splitter::HtmlSplitter;

/// Split an HTML fragment into balanced chunks sized by `policy`.
pub(crate) fn split_html(
    html: &str,
    policy: &ChunkPolicy,
    ids: &dyn IdGenerator,
) -> Result<Vec<HtmlChunk>> {
    policy.validate()?;

    let html = html.trim();
    if html.is_empty() {
        return Ok(Vec::new());
    }

    let nodes = parse_fragment(html);
    let serialized = serialize_nodes(&nodes);
    let serialized = serialized.trim();
    if serialized.is_empty() {
        return Ok(Vec::new());
    }

    let total = char_len(serialized);
    if total <= policy.max_chars {
        log::debug!("HTML fragment of {total} chars fits in one chunk");
        return Ok(vec![HtmlChunk::new(ids.next_id(), serialized.to_string())]);
    }

    let chunks: Vec<HtmlChunk> = HtmlSplitter::new(policy)
        .split(&nodes)
        .into_iter()
        .map(|html| HtmlChunk::new(ids.next_id(), html))
        .collect();

    log::debug!(
        "Split {total} chars of HTML ({} top-level nodes) into {} chunks",
        nodes.len(),
        chunks.len()
    );

    Ok(chunks)
}
