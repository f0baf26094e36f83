//! Minimal owned HTML tree and serializer.
//!
//! Markup is parsed once with an HTML5 parser (so malformed input is
//! recovered the way a browser would) and copied into [`HtmlNode`]s. From
//! then on the splitter only walks and re-serializes this owned tree.

use scraper::node::Node;
use scraper::{ElementRef, Html};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// A node of the owned tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(HtmlElement),
    Text(String),
    Comment(String),
}

/// An element with its attributes in parser order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Builder: add child
    #[must_use]
    pub fn child(mut self, child: HtmlNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Whether text children are serialized without escaping
    #[must_use]
    pub fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.contains(&self.name.as_str())
    }

    /// Level of `h1`..`h6`
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        match self.name.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Opening tag with every attribute
    #[must_use]
    pub fn open_tag(&self) -> String {
        let mut out = String::new();
        self.write_open_tag(&mut out);
        out
    }

    /// Closing tag, empty for void elements
    #[must_use]
    pub fn close_tag(&self) -> String {
        if self.is_void() {
            String::new()
        } else {
            format!("</{}>", self.name)
        }
    }

    fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
        out.push('>');
    }

    /// Serialize one child the way it would appear inside this element
    #[must_use]
    pub fn serialize_child(&self, child: &HtmlNode) -> String {
        let mut out = String::new();
        child.write(&mut out, self.is_raw_text());
        out
    }

    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        self.write_open_tag(out);
        if self.is_void() {
            return;
        }
        let raw = self.is_raw_text();
        for child in &self.children {
            child.write(out, raw);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    fn from_element_ref(element: ElementRef<'_>) -> Self {
        let value = element.value();
        let attrs = value
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let children = element
            .children()
            .filter_map(|child| match child.value() {
                Node::Text(text) => Some(HtmlNode::Text(String::from(&**text))),
                Node::Comment(comment) => Some(HtmlNode::Comment(String::from(&**comment))),
                Node::Element(_) => {
                    ElementRef::wrap(child).map(|el| HtmlNode::Element(Self::from_element_ref(el)))
                }
                _ => None,
            })
            .collect();

        Self {
            name: value.name().to_string(),
            attrs,
            children,
        }
    }
}

impl HtmlNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    #[must_use]
    pub const fn as_element(&self) -> Option<&HtmlElement> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Whitespace-only text
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Heading level when this is an `h1`..`h6` element
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        self.as_element().and_then(HtmlElement::heading_level)
    }

    /// Serialize as a child of a regular (escaping) element
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, false);
        out
    }

    fn write(&self, out: &mut String, raw_text: bool) {
        match self {
            Self::Element(element) => element.write(out),
            Self::Text(text) if raw_text => out.push_str(text),
            Self::Text(text) => escape_text(text, out),
            Self::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
}

/// Longest serialized form of one text character (`&nbsp;`)
pub(crate) const MAX_ESCAPED_CHAR_LEN: usize = 6;

/// Serialized length of one text character
pub(crate) const fn escaped_text_len(ch: char) -> usize {
    match ch {
        '&' => 5,
        '<' | '>' => 4,
        '\u{a0}' => 6,
        _ => 1,
    }
}

pub(crate) fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

/// Parse markup as body content, recovering from malformed input.
#[must_use]
pub fn parse_fragment(html: &str) -> Vec<HtmlNode> {
    let fragment = Html::parse_fragment(html);
    HtmlElement::from_element_ref(fragment.root_element()).children
}

/// Serialize a node list back to markup
#[must_use]
pub fn serialize_nodes(nodes: &[HtmlNode]) -> String {
    nodes.iter().map(HtmlNode::serialize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip_simple_markup() {
        let html = r#"<h1 class="title">A</h1><p>One <b>two</b></p><!-- note --><img src="x.png">"#;
        assert_eq!(serialize_nodes(&parse_fragment(html)), html);
    }

    #[test]
    fn test_parser_closes_unclosed_tags() {
        let nodes = parse_fragment("<div><p>open<span>deeper");
        assert_eq!(
            serialize_nodes(&nodes),
            "<div><p>open<span>deeper</span></p></div>"
        );
    }

    #[test]
    fn test_stray_close_tags_are_dropped() {
        let nodes = parse_fragment("text</em> more");
        assert_eq!(serialize_nodes(&nodes), "text more");
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let element = HtmlElement::new("a")
            .attr("title", "say \"hi\" & go")
            .child(HtmlNode::text("1 < 2 & 3 > 2"));
        assert_eq!(
            element.serialize(),
            r#"<a title="say &quot;hi&quot; &amp; go">1 &lt; 2 &amp; 3 &gt; 2</a>"#
        );
    }

    #[test]
    fn test_raw_text_elements_are_not_escaped() {
        let html = "<script>if (a < b && c) {}</script>";
        assert_eq!(serialize_nodes(&parse_fragment(html)), html);
    }

    #[test]
    fn test_open_and_close_tags() {
        let element = HtmlElement::new("section").attr("id", "s1");
        assert_eq!(element.open_tag(), r#"<section id="s1">"#);
        assert_eq!(element.close_tag(), "</section>");
        assert_eq!(HtmlElement::new("br").close_tag(), "");
    }

    #[test]
    fn test_heading_levels() {
        let nodes = parse_fragment("<h2>x</h2><h6>y</h6><p>z</p>");
        let levels: Vec<Option<u8>> = nodes.iter().map(HtmlNode::heading_level).collect();
        assert_eq!(levels, vec![Some(2), Some(6), None]);
    }

    #[test]
    fn test_escaped_text_len_matches_escape() {
        let text = "a&b<c>d\u{a0}";
        let mut out = String::new();
        escape_text(text, &mut out);
        let expected: usize = text.chars().map(escaped_text_len).sum();
        assert_eq!(out.chars().count(), expected);
        assert!(text.chars().all(|ch| escaped_text_len(ch) <= MAX_ESCAPED_CHAR_LEN));
    }
}
