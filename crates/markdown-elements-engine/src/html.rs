//! # Legacy HTML Output
//!
//! Serialises an element tree to an HTML string for callers that still want
//! text output, plus the escaping helpers shared with the default rules.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::node::{Element, Node};

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Escapes `&`, `<`, `>` and `"`.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).replace('"', "&quot;")
}

/// Resolves backslash escapes and HTML entities in a single pass.
///
/// An escaped ampersand (`\&amp;`) stays literal instead of being decoded.
pub fn unescape_all(text: &str) -> String {
    static UNESCAPE_RE: OnceLock<Regex> = OnceLock::new();
    let re = UNESCAPE_RE.get_or_init(|| {
        Regex::new(
            r##"\\([!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~])|&([A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});"##,
        )
        .expect("Invalid unescape regex")
    });

    if !text.contains('\\') && !text.contains('&') {
        return text.to_string();
    }

    re.replace_all(text, |caps: &Captures| {
        if let Some(escaped) = caps.get(1) {
            escaped.as_str().to_string()
        } else {
            html_escape::decode_html_entities(&caps[0]).into_owned()
        }
    })
    .into_owned()
}

/// Serialises `node` to HTML.
///
/// Text and attribute values are escaped; `inner_html` is written verbatim.
/// With `xhtml_out` void elements are written as `<br />`.
pub fn to_html(node: &Node, xhtml_out: bool) -> String {
    let mut out = String::new();
    write_node(&mut out, node, xhtml_out);
    out
}

fn write_node(out: &mut String, node: &Node, xhtml_out: bool) {
    match node {
        Node::Empty | Node::Bool(_) => {}
        Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
        Node::Number(n) => out.push_str(&n.to_string()),
        Node::Element(el) => write_element(out, el, xhtml_out),
        Node::Fragment(nodes) => {
            for child in nodes {
                write_node(out, child, xhtml_out);
            }
        }
    }
}

fn write_element(out: &mut String, el: &Element, xhtml_out: bool) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.props {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }

    let is_void = VOID_ELEMENTS.contains(&el.tag.as_str());
    if is_void && el.children.is_empty() && el.inner_html.is_none() {
        out.push_str(if xhtml_out { " />" } else { ">" });
        return;
    }
    out.push('>');

    match &el.inner_html {
        Some(html) => out.push_str(html),
        None => {
            for child in &el.children {
                write_node(out, child, xhtml_out);
            }
        }
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("a < b && c > d", "a &lt; b &amp;&amp; c &gt; d")]
    #[case(r#"say "hi""#, "say &quot;hi&quot;")]
    fn escapes_markup(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_html(input), expected);
    }

    #[rstest]
    #[case("rust", "rust")]
    #[case(r"c\+\+", "c++")]
    #[case("a&amp;b", "a&b")]
    #[case(r"\&amp;", "&amp;")]
    #[case("&#65;&#x42;", "AB")]
    fn unescapes_info_strings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unescape_all(input), expected);
    }

    #[test]
    fn serialises_nested_elements() {
        let node: Node = Element::new("p")
            .with_child("a ")
            .with_child(Element::new("em").with_child("b & c"))
            .into();
        insta::assert_snapshot!(to_html(&node, false), @"<p>a <em>b &amp; c</em></p>");
    }

    #[test]
    fn void_elements_follow_xhtml_flag() {
        let node = Node::Fragment(vec![Element::new("br").into(), Node::text("\n")]);
        assert_eq!(to_html(&node, false), "<br>\n");
        assert_eq!(to_html(&node, true), "<br />\n");
    }

    #[test]
    fn attributes_are_sorted_and_escaped() {
        let node: Node = Element::new("img")
            .with_prop("src", "a.png")
            .with_prop("alt", "\"quoted\"")
            .into();
        assert_eq!(
            to_html(&node, true),
            r#"<img alt="&quot;quoted&quot;" src="a.png" />"#
        );
    }

    #[test]
    fn inner_html_is_written_verbatim() {
        let node: Node = Element::new("code")
            .with_inner_html("<span class=\"kw\">fn</span>")
            .with_child("ignored")
            .into();
        assert_eq!(
            to_html(&node, false),
            r#"<code><span class="kw">fn</span></code>"#
        );
    }

    #[test]
    fn markers_produce_nothing() {
        let node = Node::Fragment(vec![Node::Empty, Node::Bool(true), Node::Number(2.0)]);
        assert_eq!(to_html(&node, false), "2");
    }
}
