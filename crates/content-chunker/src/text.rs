//! Text boundary splitter.
//!
//! Greedy accumulation toward `max_chars`, falling back through
//! [`BoundaryLevel`]s when a single unit is too large and merging an
//! undersized tail into the previous chunk when it fits.

use crate::boundary::{char_len, BoundaryLevel};
use crate::citation::IdGenerator;
use crate::config::ChunkPolicy;
use crate::error::Result;
use crate::types::Chunk;

/// Growing chunk plus the separator that preceded its first unit
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    buf: String,
    len: usize,
    lead: &'static str,
}

impl Accumulator {
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether `unit` can be appended after `sep` without passing `max_chars`
    pub(crate) fn fits(&self, sep: &str, unit_len: usize, max_chars: usize) -> bool {
        if self.is_empty() {
            unit_len <= max_chars
        } else {
            self.len + char_len(sep) + unit_len <= max_chars
        }
    }

    pub(crate) fn push(&mut self, sep: &'static str, unit: &str, unit_len: usize) {
        if self.is_empty() {
            self.lead = sep;
        } else {
            self.buf.push_str(sep);
            self.len += char_len(sep);
        }
        self.buf.push_str(unit);
        self.len += unit_len;
    }

    /// Take the content out, leaving the accumulator empty
    pub(crate) fn take(&mut self) -> Option<(String, usize, &'static str)> {
        if self.is_empty() {
            return None;
        }
        let len = std::mem::take(&mut self.len);
        let lead = std::mem::take(&mut self.lead);
        Some((std::mem::take(&mut self.buf), len, lead))
    }
}

/// Append an undersized tail to the last piece when the window allows it,
/// otherwise emit it on its own.
pub(crate) fn merge_tail(
    out: &mut Vec<String>,
    tail: String,
    tail_len: usize,
    lead: &str,
    policy: &ChunkPolicy,
) {
    if tail_len >= policy.min_chars {
        out.push(tail);
        return;
    }

    if let Some(prev) = out.last_mut() {
        if char_len(prev) + char_len(lead) + tail_len <= policy.max_chars {
            prev.push_str(lead);
            prev.push_str(&tail);
            return;
        }
    }

    out.push(tail);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    /// Regular accumulation
    Normal,
    /// Filling an undersized accumulator with the pieces of one unit
    TopOff,
}

struct TextSplitter<'p> {
    policy: &'p ChunkPolicy,
    acc: Accumulator,
    out: Vec<String>,
}

impl TextSplitter<'_> {
    fn flush(&mut self) {
        if let Some((text, _, _)) = self.acc.take() {
            self.out.push(text);
        }
    }

    fn feed(&mut self, text: &str, level: BoundaryLevel, lead: &'static str, mode: Feed) {
        let max = self.policy.max_chars;
        let min = self.policy.min_chars;

        for (idx, unit) in level.units(text, max).into_iter().enumerate() {
            let sep = if idx == 0 { lead } else { level.joiner() };
            let unit_len = char_len(unit);

            if self.acc.fits(sep, unit_len, max) {
                self.acc.push(sep, unit, unit_len);
                continue;
            }

            let finer = level.finer();

            if unit_len > max {
                if let Some(finer) = finer {
                    if self.acc.len() >= min {
                        self.flush();
                    }
                    log::trace!(
                        "{} unit of {unit_len} chars exceeds {max}, descending to {}",
                        level.as_str(),
                        finer.as_str()
                    );
                    self.feed(unit, finer, sep, Feed::Normal);
                    continue;
                }
            }

            // Topping off stops above words so a link that fits is never torn.
            let can_top_off = mode == Feed::Normal
                && self.acc.len() < min
                && matches!(
                    finer,
                    Some(BoundaryLevel::Sentence | BoundaryLevel::MarkdownLinkSegment)
                );

            match finer {
                Some(finer) if can_top_off => self.feed(unit, finer, sep, Feed::TopOff),
                _ => {
                    self.flush();
                    self.acc.push(sep, unit, unit_len);
                }
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        if let Some((tail, tail_len, lead)) = self.acc.take() {
            merge_tail(&mut self.out, tail, tail_len, lead, self.policy);
        }
        self.out
    }
}

/// Split `text` into trimmed pieces of at most `policy.max_chars` characters.
///
/// The policy must already be validated. Text that fits the window is not
/// handled specially here; callers decide whether to keep it verbatim.
pub(crate) fn split_pieces(text: &str, policy: &ChunkPolicy) -> Vec<String> {
    let mut splitter = TextSplitter {
        policy,
        acc: Accumulator::default(),
        out: Vec::new(),
    };
    splitter.feed(text, BoundaryLevel::Paragraph, "", Feed::Normal);
    splitter.finish()
}

/// Split plain text into chunks sized by `policy`.
///
/// Text that already fits is returned verbatim as a single chunk; empty or
/// whitespace-only text yields no chunks.
pub(crate) fn split_text(
    text: &str,
    policy: &ChunkPolicy,
    ids: &dyn IdGenerator,
) -> Result<Vec<Chunk>> {
    policy.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let text_len = char_len(text);
    if text_len <= policy.max_chars {
        return Ok(vec![Chunk::new(ids.next_id(), text.to_string())]);
    }

    let chunks: Vec<Chunk> = split_pieces(text, policy)
        .into_iter()
        .map(|piece| Chunk::new(ids.next_id(), piece))
        .collect();

    log::debug!(
        "Split {text_len} chars into {} chunks (window {}-{})",
        chunks.len(),
        policy.min_chars,
        policy.max_chars
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::SequentialIds;
    use crate::error::ChunkerError;
    use pretty_assertions::assert_eq;

    fn pieces(text: &str, min: usize, max: usize) -> Vec<String> {
        split_pieces(text, &ChunkPolicy::new(min, max))
    }

    #[test]
    fn test_paragraphs_are_packed_greedily() {
        let text = "aaaa\n\nbbbb\n\ncccc\n\ndddd";
        assert_eq!(pieces(text, 0, 10), vec!["aaaa\n\nbbbb", "cccc\n\ndddd"]);
    }

    #[test]
    fn test_oversized_paragraph_falls_back_to_sentences() {
        let text = "One two. Three four. Five six.";
        assert_eq!(
            pieces(text, 0, 20),
            vec!["One two. Three four.", "Five six."]
        );
    }

    #[test]
    fn test_sentence_too_long_falls_back_to_words() {
        let text = "alpha beta gamma delta epsilon";
        assert_eq!(
            pieces(text, 0, 12),
            vec!["alpha beta", "gamma delta", "epsilon"]
        );
    }

    #[test]
    fn test_single_long_word_is_sliced_by_characters() {
        assert_eq!(pieces("abcdefghij", 0, 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_undersized_tail_merges_into_previous() {
        let policy = ChunkPolicy::new(5, 10);
        let mut out = vec!["abc".to_string()];
        merge_tail(&mut out, "de".to_string(), 2, " ", &policy);
        assert_eq!(out, vec!["abc de"]);
    }

    #[test]
    fn test_undersized_tail_kept_when_merge_overflows() {
        let policy = ChunkPolicy::new(5, 10);
        let mut out = vec!["abcdefgh".to_string()];
        merge_tail(&mut out, "xyz".to_string(), 3, " ", &policy);
        assert_eq!(out, vec!["abcdefgh", "xyz"]);
    }

    #[test]
    fn test_tail_at_min_is_emitted_as_is() {
        let policy = ChunkPolicy::new(2, 10);
        let mut out = vec!["abc".to_string()];
        merge_tail(&mut out, "de".to_string(), 2, " ", &policy);
        assert_eq!(out, vec!["abc", "de"]);
    }

    #[test]
    fn test_short_final_paragraph_joins_current() {
        let text = "aaaaaaaa\n\nbbbbbbbb\n\ncc";
        assert_eq!(pieces(text, 5, 12), vec!["aaaaaaaa", "bbbbbbbb\n\ncc"]);
    }

    #[test]
    fn test_small_current_is_topped_off_with_sentences() {
        // "Hi." is under min, the next paragraph would overflow as a whole,
        // so its first sentence is pulled forward.
        let text = "Hi.\n\nFirst part here. Second part.";
        assert_eq!(
            pieces(text, 10, 30),
            vec!["Hi.\n\nFirst part here.", "Second part."]
        );
    }

    #[test]
    fn test_large_current_is_flushed_before_paragraph() {
        let text = "Already big enough.\n\nFirst part here. Second part here.";
        assert_eq!(
            pieces(text, 10, 40),
            vec!["Already big enough.", "First part here. Second part here."]
        );
    }

    #[test]
    fn test_large_current_is_flushed_before_oversized_paragraph() {
        let text = "Already big enough.\n\nFirst part here. Second part here. Third part here.";
        assert_eq!(
            pieces(text, 10, 40),
            vec![
                "Already big enough.",
                "First part here. Second part here.",
                "Third part here."
            ]
        );
    }

    #[test]
    fn test_small_current_rides_into_oversized_paragraph() {
        let text = "Hi.\n\nFirst part here. Second part here. Third part here.";
        assert_eq!(
            pieces(text, 10, 40),
            vec![
                "Hi.\n\nFirst part here. Second part here.",
                "Third part here."
            ]
        );
    }

    #[test]
    fn test_markdown_link_is_not_torn() {
        let text = "Intro words [a link with words](https://e.io/x) trailing words";
        let out = pieces(text, 0, 40);
        assert!(out
            .iter()
            .any(|p| p.contains("[a link with words](https://e.io/x)")));
        assert!(out.iter().all(|p| char_len(p) <= 40));
    }

    #[test]
    fn test_every_piece_within_max() {
        let text = "word ".repeat(500) + &"x".repeat(333) + "\n\n" + &"Sentence. ".repeat(80);
        for max in [1, 7, 50, 256] {
            let out = pieces(&text, 0, max);
            assert!(out.iter().all(|p| char_len(p) <= max), "max={max}");
            assert!(out.iter().all(|p| !p.trim().is_empty()));
        }
    }

    #[test]
    fn test_content_is_preserved_modulo_whitespace() {
        let text = "The quick brown fox. Jumps over!\n\nThe lazy dog? Yes [link](u) ok.\n\n\nEnd";
        let out = pieces(text, 5, 18);
        let squash = |s: &str| s.split_whitespace().collect::<String>();
        assert_eq!(squash(&out.join(" ")), squash(text));
    }

    #[test]
    fn test_split_text_keeps_fitting_text_verbatim() {
        let ids = SequentialIds::new("t");
        let text = "  Short.\n\n ";
        let chunks = split_text(text, &ChunkPolicy::new(100, 1000), &ids).unwrap();
        assert_eq!(chunks, vec![Chunk::new("t-0".to_string(), text.to_string())]);
    }

    #[test]
    fn test_split_text_rejects_inverted_window_first() {
        let ids = SequentialIds::default();
        let err = split_text("anything", &ChunkPolicy::new(500, 100), &ids).unwrap_err();
        assert_eq!(err, ChunkerError::invalid_policy(500, 100));
        assert_eq!(ids.issued(), 0);
    }

    #[test]
    fn test_split_text_blank_input_yields_nothing() {
        let ids = SequentialIds::default();
        assert!(split_text(" \n\t ", &ChunkPolicy::for_text(), &ids)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_split_text_tags_each_chunk() {
        let ids = SequentialIds::new("c");
        let text = format!("{}\n\n{}", "a".repeat(600), "b".repeat(600));
        let chunks = split_text(&text, &ChunkPolicy::for_text(), &ids).unwrap();
        let citation_ids: Vec<&str> = chunks.iter().map(|c| c.citation_id.as_str()).collect();
        assert_eq!(citation_ids, vec!["c-0", "c-1"]);
        assert_eq!(chunks[0].text, "a".repeat(600));
        assert_eq!(chunks[1].text, "b".repeat(600));
        assert!(chunks.iter().all(|c| c.timestamp_seconds.is_none()));
    }

    #[test]
    fn test_accumulator_tracks_lead_separator() {
        let mut acc = Accumulator::default();
        assert!(acc.fits("\n\n", 5, 5));
        acc.push("\n\n", "hello", 5);
        assert!(!acc.fits(" ", 1, 6));
        acc.push(" ", "x", 1);
        assert_eq!(acc.take(), Some(("hello x".to_string(), 7, "\n\n")));
        assert!(acc.is_empty());
    }
}
