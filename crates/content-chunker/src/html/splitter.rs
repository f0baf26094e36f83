use super::tree::{
    escape_text, escaped_text_len, serialize_nodes, HtmlElement, HtmlNode, MAX_ESCAPED_CHAR_LEN,
};
use crate::boundary::{char_len, BoundaryLevel};
use crate::config::ChunkPolicy;
use crate::text::{merge_tail, Accumulator};

/// Highest heading level that opens a new section
const SECTION_HEADING_MAX_LEVEL: u8 = 3;

/// Raw character slices of serialized markup, the last resort
fn raw_slices(html: &str, budget: usize) -> Vec<String> {
    BoundaryLevel::Character
        .units(html, budget)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Pieces of `budget` chars or fewer, concatenated as they come
#[derive(Default)]
struct Packer {
    acc: Accumulator,
    out: Vec<String>,
}

impl Packer {
    fn offer(&mut self, piece: &str, budget: usize) {
        let len = char_len(piece);
        if !self.acc.fits("", len, budget) {
            self.flush();
        }
        self.acc.push("", piece, len);
    }

    fn flush(&mut self) {
        if let Some((piece, _, _)) = self.acc.take() {
            self.out.push(piece);
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }
}

/// Split a text node so each piece serializes to at most `budget` chars.
///
/// Cuts prefer whitespace; a run without whitespace is cut between
/// characters. Only a budget narrower than one character reference cuts
/// inside it.
fn split_text_node(text: &str, raw: bool, budget: usize) -> Vec<String> {
    let cost = |ch: char| if raw { 1 } else { escaped_text_len(ch) };
    let serialize = |s: &str| {
        if raw {
            s.to_string()
        } else {
            let mut out = String::new();
            escape_text(s, &mut out);
            out
        }
    };

    let mut packer = Packer::default();
    for token in text.split_inclusive(char::is_whitespace) {
        let token_cost: usize = token.chars().map(cost).sum();
        if token_cost <= budget {
            packer.offer(&serialize(token), budget);
            continue;
        }

        let mut run = String::new();
        let mut run_cost = 0;
        for ch in token.chars() {
            let ch_cost = cost(ch);
            if run_cost + ch_cost > budget && !run.is_empty() {
                packer.offer(&serialize(&run), budget);
                run.clear();
                run_cost = 0;
            }
            if ch_cost > budget {
                // A single escaped char wider than the window.
                for piece in raw_slices(&serialize(&ch.to_string()), budget) {
                    packer.offer(&piece, budget);
                }
                continue;
            }
            run.push(ch);
            run_cost += ch_cost;
        }
        if !run.is_empty() {
            packer.offer(&serialize(&run), budget);
        }
    }

    packer.finish()
}

/// Split an element into balanced pieces of at most `budget` chars.
///
/// Each piece re-opens the element with its original attributes, holds as
/// many children as fit and closes it again. When the tags leave no room for
/// the widest character reference the serialized element is sliced raw.
fn split_element(element: &HtmlElement, budget: usize) -> Vec<String> {
    let open = element.open_tag();
    let close = element.close_tag();
    let wrapper_len = char_len(&open) + char_len(&close);

    if element.children.is_empty() || wrapper_len + MAX_ESCAPED_CHAR_LEN > budget {
        log::debug!(
            "<{}> cannot be subdivided within {budget} chars, slicing raw markup",
            element.name
        );
        return raw_slices(&element.serialize(), budget);
    }

    let inner_budget = budget - wrapper_len;
    let raw = element.is_raw_text();
    let mut packer = Packer::default();

    for child in &element.children {
        let html = element.serialize_child(child);
        if char_len(&html) <= inner_budget {
            packer.offer(&html, inner_budget);
            continue;
        }

        let pieces = match child {
            HtmlNode::Element(grandchild) => split_element(grandchild, inner_budget),
            HtmlNode::Text(text) => split_text_node(text, raw, inner_budget),
            HtmlNode::Comment(_) => raw_slices(&html, inner_budget),
        };
        for piece in pieces {
            packer.offer(&piece, inner_budget);
        }
    }

    packer
        .finish()
        .into_iter()
        .map(|inner| format!("{open}{inner}{close}"))
        .collect()
}

/// Split any node into pieces of at most `budget` chars
fn split_node(node: &HtmlNode, budget: usize) -> Vec<String> {
    match node {
        HtmlNode::Element(element) => split_element(element, budget),
        HtmlNode::Text(text) => split_text_node(text, false, budget),
        HtmlNode::Comment(_) => raw_slices(&node.serialize(), budget),
    }
}

/// Whether any direct child opens a section
fn has_section_headings(nodes: &[HtmlNode]) -> bool {
    nodes.iter().any(is_section_heading)
}

fn is_section_heading(node: &HtmlNode) -> bool {
    node.heading_level()
        .is_some_and(|level| level <= SECTION_HEADING_MAX_LEVEL)
}

/// Cut the node list before every section heading that follows content
fn sections(nodes: &[HtmlNode]) -> Vec<&[HtmlNode]> {
    let mut out = Vec::new();
    let mut start = 0;

    for (idx, node) in nodes.iter().enumerate() {
        if is_section_heading(node) && nodes[start..idx].iter().any(|n| !n.is_blank()) {
            out.push(&nodes[start..idx]);
            start = idx;
        }
    }
    out.push(&nodes[start..]);

    out
}

pub(crate) struct HtmlSplitter<'p> {
    policy: &'p ChunkPolicy,
    acc: Accumulator,
    out: Vec<String>,
}

impl<'p> HtmlSplitter<'p> {
    pub(crate) fn new(policy: &'p ChunkPolicy) -> Self {
        Self {
            policy,
            acc: Accumulator::default(),
            out: Vec::new(),
        }
    }

    fn flush(&mut self) {
        if let Some((html, _, _)) = self.acc.take() {
            self.out.push(html);
        }
    }

    /// Append a piece that is known to fit the window on its own
    fn offer(&mut self, piece: &str) {
        let len = char_len(piece);
        if !self.acc.fits("", len, self.policy.max_chars) {
            self.flush();
        }
        self.acc.push("", piece, len);
    }

    /// Top-level splitting: accumulate serialized nodes, subdividing any
    /// node larger than the window.
    pub(crate) fn feed_nodes(&mut self, nodes: &[HtmlNode]) {
        let max = self.policy.max_chars;

        for node in nodes {
            let html = node.serialize();
            let len = char_len(&html);

            if node.is_blank() && (self.acc.is_empty() || !self.acc.fits("", len, max)) {
                continue;
            }

            if self.acc.fits("", len, max) {
                self.acc.push("", &html, len);
                continue;
            }

            if len > max {
                log::trace!("Node of {len} chars exceeds {max}, splitting by children");
                for piece in split_node(node, max) {
                    self.offer(&piece);
                }
                continue;
            }

            // The node fits alone but not after the current chunk. Flushing
            // here, even below min_chars, keeps the hard cap.
            self.flush();
            self.acc.push("", &html, len);
        }
    }

    /// Heading-delimited splitting: fold whole sections greedily, handing
    /// sections that cannot be placed whole to top-level splitting.
    pub(crate) fn feed_sections(&mut self, nodes: &[HtmlNode]) {
        let max = self.policy.max_chars;

        for section in sections(nodes) {
            let html = serialize_nodes(section);
            let html = html.trim();
            if html.is_empty() {
                continue;
            }
            let len = char_len(html);

            if self.acc.fits("", len, max) {
                self.acc.push("", html, len);
            } else if len <= max && self.acc.len() >= self.policy.min_chars {
                self.flush();
                self.acc.push("", html, len);
            } else {
                self.feed_nodes(section);
            }
        }
    }

    /// Split a parsed node list, by sections when it has headings
    pub(crate) fn split(mut self, nodes: &[HtmlNode]) -> Vec<String> {
        if has_section_headings(nodes) {
            self.feed_sections(nodes);
        } else {
            self.feed_nodes(nodes);
        }
        self.finish()
    }

    fn finish(mut self) -> Vec<String> {
        if let Some((tail, tail_len, lead)) = self.acc.take() {
            merge_tail(&mut self.out, tail, tail_len, lead, self.policy);
        }
        self.out
    }
}
