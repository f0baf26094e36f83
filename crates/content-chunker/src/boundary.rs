//! Boundary hierarchy used to cut oversized units.
//!
//! Levels are ordered from coarsest to finest. A unit that does not fit at one
//! level is re-split at [`BoundaryLevel::finer`], never at a coarser level.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

/// Granularity at which content may be cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryLevel {
    /// Blocks separated by one or more blank lines
    Paragraph,
    /// Runs ending in `.`, `!` or `?` followed by whitespace
    Sentence,
    /// Whitespace-delimited tokens that keep `[text](url)` links whole
    MarkdownLinkSegment,
    /// Whitespace-delimited tokens
    Word,
    /// Grapheme-aligned slices of at most `max_chars`
    Character,
}

impl BoundaryLevel {
    /// Every level, coarsest first
    pub const ALL: [Self; 5] = [
        Self::Paragraph,
        Self::Sentence,
        Self::MarkdownLinkSegment,
        Self::Word,
        Self::Character,
    ];

    /// Next level down, `None` at the bottom
    #[must_use]
    pub const fn finer(self) -> Option<Self> {
        match self {
            Self::Paragraph => Some(Self::Sentence),
            Self::Sentence => Some(Self::MarkdownLinkSegment),
            Self::MarkdownLinkSegment => Some(Self::Word),
            Self::Word => Some(Self::Character),
            Self::Character => None,
        }
    }

    /// Separator placed between two units of this level when re-joined
    #[must_use]
    pub const fn joiner(self) -> &'static str {
        match self {
            Self::Paragraph => "\n\n",
            Self::Sentence | Self::MarkdownLinkSegment | Self::Word => " ",
            Self::Character => "",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
            Self::MarkdownLinkSegment => "markdown_link_segment",
            Self::Word => "word",
            Self::Character => "character",
        }
    }

    /// Cut `text` into the units of this level.
    ///
    /// Units are trimmed and non-empty. `max_chars` only matters at the
    /// character level, where every unit is at most that long.
    #[must_use]
    pub fn units(self, text: &str, max_chars: usize) -> Vec<&str> {
        match self {
            Self::Paragraph => paragraphs(text),
            Self::Sentence => sentences(text),
            Self::MarkdownLinkSegment => link_segments(text),
            Self::Word => text.split_whitespace().collect(),
            Self::Character => char_slices(text, max_chars),
        }
    }
}

/// Length in characters
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Prefix of `text` holding at most `max_chars` characters
pub(crate) fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid paragraph regex"))
}

fn sentence_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("valid sentence regex"))
}

fn markdown_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\[\]]*\]\([^()\s]*\)").expect("valid link regex"))
}

fn trimmed_non_empty<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    parts.map(str::trim).filter(|part| !part.is_empty()).collect()
}

fn paragraphs(text: &str) -> Vec<&str> {
    trimmed_non_empty(paragraph_break().split(text))
}

/// Byte ranges of markdown links in `text`
fn link_spans(text: &str) -> Vec<Range<usize>> {
    markdown_link().find_iter(text).map(|m| m.range()).collect()
}

fn inside_any(spans: &[Range<usize>], pos: usize) -> bool {
    spans.iter().any(|span| span.start < pos && pos < span.end)
}

fn sentences(text: &str) -> Vec<&str> {
    let links = link_spans(text);
    let mut out = Vec::new();
    let mut start = 0;

    for end in sentence_end().find_iter(text) {
        if inside_any(&links, end.start()) {
            continue;
        }
        out.push(&text[start..end.end()]);
        start = end.end();
    }
    out.push(&text[start..]);

    trimmed_non_empty(out.into_iter())
}

fn link_segments(text: &str) -> Vec<&str> {
    let links = link_spans(text);
    let mut out = Vec::new();
    let mut token_start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() && !inside_any(&links, idx) {
            if let Some(start) = token_start.take() {
                out.push(&text[start..idx]);
            }
        } else if token_start.is_none() {
            token_start = Some(idx);
        }
    }
    if let Some(start) = token_start {
        out.push(&text[start..]);
    }

    out
}

fn char_slices(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut out = Vec::new();
    let mut start = 0;
    let mut len = 0;

    for (idx, grapheme) in text.grapheme_indices(true) {
        let grapheme_len = char_len(grapheme);

        if grapheme_len > max_chars {
            // A single cluster longer than the window: cut it by chars.
            if len > 0 {
                out.push(&text[start..idx]);
            }
            let mut rest = grapheme;
            while !rest.is_empty() {
                let piece = char_prefix(rest, max_chars);
                out.push(piece);
                rest = &rest[piece.len()..];
            }
            start = idx + grapheme.len();
            len = 0;
            continue;
        }

        if len + grapheme_len > max_chars {
            out.push(&text[start..idx]);
            start = idx;
            len = 0;
        }
        len += grapheme_len;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }

    out
}
