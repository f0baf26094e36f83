//! Timestamp-aware splitting for transcripts.
//!
//! Text is partitioned at inline `[MM:SS]`, `(MM:SS)`, `[HH:MM:SS]` and
//! `(HH:MM:SS)` markers. Text after a marker belongs to that marker until the
//! next one; only text before the first marker is untimed.

use crate::boundary::char_len;
use crate::citation::IdGenerator;
use crate::config::TranscriptPolicy;
use crate::error::Result;
use crate::text::{split_pieces, split_text};
use crate::types::Chunk;
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[(?:(\d+):)?(\d+):(\d{2})\]|\((?:(\d+):)?(\d+):(\d{2})\)")
            .expect("valid timestamp regex")
    })
}

/// Total seconds of a marker match, `None` when the numbers overflow
fn marker_seconds(caps: &Captures<'_>) -> Option<u64> {
    let group = |bracketed: usize, parenthesized: usize| {
        caps.get(bracketed)
            .or_else(|| caps.get(parenthesized))
            .map(|m| m.as_str().parse::<u64>())
    };

    let hours = match group(1, 4) {
        Some(parsed) => parsed.ok()?,
        None => 0,
    };
    let minutes = group(2, 5)?.ok()?;
    let seconds = group(3, 6)?.ok()?;

    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// A run of transcript text and the marker that opened it
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    timestamp_seconds: Option<u64>,
    text: &'a str,
}

/// Partition `text` at timestamp markers; `None` when there are no markers.
fn segments(text: &str) -> Option<Vec<Segment<'_>>> {
    let mut out = Vec::new();
    let mut cursor = 0;
    let mut current: Option<u64> = None;
    let mut found = false;

    for caps in marker().captures_iter(text) {
        let Some(seconds) = marker_seconds(&caps) else {
            continue;
        };
        let Some(whole) = caps.get(0) else {
            continue;
        };

        push_segment(&mut out, current, &text[cursor..whole.start()]);
        current = Some(seconds);
        cursor = whole.end();
        found = true;
    }

    if !found {
        return None;
    }

    push_segment(&mut out, current, &text[cursor..]);
    Some(out)
}

fn push_segment<'a>(out: &mut Vec<Segment<'a>>, timestamp_seconds: Option<u64>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        out.push(Segment {
            timestamp_seconds,
            text,
        });
    }
}

/// Chunk text under construction
#[derive(Debug)]
struct Draft {
    timestamp_seconds: Option<u64>,
    text: String,
    len: usize,
}

impl Draft {
    fn new(timestamp_seconds: Option<u64>, text: String) -> Self {
        let len = char_len(&text);
        Self {
            timestamp_seconds,
            text,
            len,
        }
    }
}

/// Fold segments into drafts of at most `policy.max_chars`.
fn fold_segments(segments: Vec<Segment<'_>>, policy: &TranscriptPolicy) -> Vec<Draft> {
    let max = policy.max_chars;
    let window = policy.window();
    let mut drafts: Vec<Draft> = Vec::new();
    let mut current: Option<Draft> = None;

    for segment in segments {
        let segment_len = char_len(segment.text);

        if let Some(draft) = current.as_mut() {
            let same_marker = draft.timestamp_seconds.is_some()
                && draft.timestamp_seconds == segment.timestamp_seconds;
            if same_marker && draft.len + 1 + segment_len <= max {
                draft.text.push('\n');
                draft.text.push_str(segment.text);
                draft.len += 1 + segment_len;
                continue;
            }
        }

        drafts.extend(current.take());

        if segment_len > max {
            let mut pieces = split_pieces(segment.text, &window);
            let last = pieces.pop();
            drafts.extend(
                pieces
                    .into_iter()
                    .map(|piece| Draft::new(segment.timestamp_seconds, piece)),
            );
            current = last.map(|piece| Draft::new(segment.timestamp_seconds, piece));
        } else {
            current = Some(Draft::new(
                segment.timestamp_seconds,
                segment.text.to_string(),
            ));
        }
    }

    drafts.extend(current);
    drafts
}

/// Merge consecutive groups so at most `max_chunks` drafts remain.
fn cap_drafts(drafts: Vec<Draft>, max_chunks: usize) -> Vec<Draft> {
    if drafts.len() <= max_chunks {
        return drafts;
    }

    let group_size = drafts.len().div_ceil(max_chunks);
    log::debug!(
        "Merging {} transcript chunks in groups of {group_size} to fit cap of {max_chunks}",
        drafts.len()
    );

    let mut merged: Vec<Draft> = drafts
        .chunks(group_size)
        .map(|group| {
            let text = group
                .iter()
                .map(|draft| draft.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            let earliest = group
                .iter()
                .filter_map(|draft| draft.timestamp_seconds)
                .min();
            Draft::new(earliest, text)
        })
        .collect();

    merged.truncate(max_chunks);
    merged
}

/// Split a transcript with inline timestamp markers into timed chunks.
pub(crate) fn split_transcript(
    text: &str,
    policy: &TranscriptPolicy,
    ids: &dyn IdGenerator,
) -> Result<Vec<Chunk>> {
    policy.validate()?;

    let Some(segments) = segments(text) else {
        log::debug!("No timestamp markers found, splitting as plain text");
        return split_text(text, &policy.window(), ids);
    };

    let segment_count = segments.len();
    let drafts = cap_drafts(fold_segments(segments, policy), policy.max_chunks);
    log::debug!(
        "Folded {segment_count} transcript segments into {} chunks",
        drafts.len()
    );

    Ok(drafts
        .into_iter()
        .map(|draft| Chunk::timed(ids.next_id(), draft.text, draft.timestamp_seconds))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::SequentialIds;
    use pretty_assertions::assert_eq;

    fn split(text: &str, policy: TranscriptPolicy) -> Vec<Chunk> {
        split_transcript(text, &policy, &SequentialIds::new("t")).unwrap()
    }

    fn shape(chunks: &[Chunk]) -> Vec<(Option<u64>, &str)> {
        chunks
            .iter()
            .map(|c| (c.timestamp_seconds, c.text.as_str()))
            .collect()
    }

    #[test]
    fn test_marker_forms_parse_to_seconds() {
        let text = "[01:05] a (02:10) b [1:00:01] c (10:00:00) d";
        let segs = segments(text).unwrap();
        let seconds: Vec<Option<u64>> = segs.iter().map(|s| s.timestamp_seconds).collect();
        assert_eq!(seconds, vec![Some(65), Some(130), Some(3601), Some(36000)]);
    }

    #[test]
    fn test_unbracketed_times_are_plain_text() {
        assert_eq!(segments("meet at 10:30 today"), None);
    }

    #[test]
    fn test_leading_text_is_untimed() {
        let segs = segments("Intro words [00:05] first").unwrap();
        assert_eq!(
            segs,
            vec![
                Segment {
                    timestamp_seconds: None,
                    text: "Intro words"
                },
                Segment {
                    timestamp_seconds: Some(5),
                    text: "first"
                },
            ]
        );
    }

    #[test]
    fn test_same_timestamp_segments_merge() {
        let chunks = split(
            "[00:10] Hello [00:10] world [00:45] Next",
            TranscriptPolicy::new(100, 800, 50),
        );
        assert_eq!(
            shape(&chunks),
            vec![(Some(10), "Hello\nworld"), (Some(45), "Next")]
        );
        assert_eq!(chunks[0].citation_id, "t-0");
        assert_eq!(chunks[1].citation_id, "t-1");
    }

    #[test]
    fn test_same_timestamp_overflow_starts_new_chunk() {
        let chunks = split(
            "[00:10] aaaa [00:10] bbbb [00:10] cccc",
            TranscriptPolicy::new(0, 9, 50),
        );
        assert_eq!(
            shape(&chunks),
            vec![(Some(10), "aaaa\nbbbb"), (Some(10), "cccc")]
        );
    }

    #[test]
    fn test_text_after_marker_keeps_marker_timestamp() {
        // There is no way to "leave" a marker: text up to the next marker
        // inherits it, so only the leading run is untimed.
        let chunks = split(
            "preface [00:01] one\n\nstill one [00:02] two",
            TranscriptPolicy::default(),
        );
        assert_eq!(
            shape(&chunks),
            vec![
                (None, "preface"),
                (Some(1), "one\n\nstill one"),
                (Some(2), "two")
            ]
        );
    }

    #[test]
    fn test_oversized_segment_falls_back_to_text_splitter() {
        let chunks = split(
            "[00:30] First sentence here. Second sentence here. [01:00] tail",
            TranscriptPolicy::new(0, 30, 50),
        );
        assert_eq!(
            shape(&chunks),
            vec![
                (Some(30), "First sentence here."),
                (Some(30), "Second sentence here."),
                (Some(60), "tail"),
            ]
        );
    }

    #[test]
    fn test_no_markers_delegates_to_text_splitter() {
        let chunks = split("just words", TranscriptPolicy::default());
        assert_eq!(shape(&chunks), vec![(None, "just words")]);

        let long = "Sentence number one. ".repeat(100);
        let chunks = split(&long, TranscriptPolicy::default());
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.char_len() <= 800));
        assert!(chunks.iter().all(|c| c.timestamp_seconds.is_none()));
    }

    #[test]
    fn test_cap_merges_groups_and_keeps_earliest_timestamp() {
        let text: String = (0..10).map(|i| format!("[00:{:02}] line{i} ", 50 - i)).collect();
        let chunks = split(&text, TranscriptPolicy::new(0, 800, 4));

        // ceil(10 / 4) = 3 per group -> groups of 3, 3, 3, 1
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].text, "line0\n\nline1\n\nline2");
        assert_eq!(chunks[0].timestamp_seconds, Some(48));
        assert_eq!(chunks[3].text, "line9");
        assert_eq!(chunks[3].timestamp_seconds, Some(41));
    }

    #[test]
    fn test_cap_ignores_untimed_chunks_when_choosing_timestamp() {
        let chunks = split("intro [00:07] a [00:09] b", TranscriptPolicy::new(0, 800, 1));
        assert_eq!(shape(&chunks), vec![(Some(7), "intro\n\na\n\nb")]);
    }

    #[test]
    fn test_never_more_than_cap() {
        let text: String = (0..200).map(|i| format!("[{}:{:02}] x{i} ", i / 60, i % 60)).collect();
        for cap in [1, 3, 7, 50, 199, 500] {
            let chunks = split(&text, TranscriptPolicy::new(0, 800, cap));
            assert!(chunks.len() <= cap, "cap={cap}");
        }
    }

    #[test]
    fn test_timestamps_non_decreasing_without_cap() {
        let text = "[00:01] a [00:02] b [00:02] c [00:05] d [01:00:00] e";
        let chunks = split(text, TranscriptPolicy::default());
        let stamps: Vec<u64> = chunks.iter().filter_map(|c| c.timestamp_seconds).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let err = split_transcript("[00:01] a", &TranscriptPolicy::new(0, 10, 0), &SequentialIds::default());
        assert!(err.is_err());
    }
}
