use std::fmt::Write;

use markdown_elements_engine::{Node, Token};

/// Indented outline of an element tree, one node per line.
pub fn format_tree(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, 0);
    }
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Empty | Node::Bool(_) => {}
        Node::Text(text) => {
            let _ = writeln!(out, "{indent}{text:?}");
        }
        Node::Number(n) => {
            let _ = writeln!(out, "{indent}{n}");
        }
        Node::Element(el) => {
            let _ = write!(out, "{indent}<{}", el.tag);
            if let Some(key) = &el.key {
                let _ = write!(out, " key={key}");
            }
            for (name, value) in &el.props {
                let _ = write!(out, " {name}={value:?}");
            }
            out.push_str(">\n");
            if let Some(html) = &el.inner_html {
                let _ = writeln!(out, "{indent}  (html) {html:?}");
            }
            for child in &el.children {
                write_node(out, child, depth + 1);
            }
        }
        Node::Fragment(nodes) => {
            for child in nodes {
                write_node(out, child, depth);
            }
        }
    }
}

/// One line per token, indented by nesting level; inline children are nested.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    write_tokens(&mut out, tokens, 0);
    out
}

fn write_tokens(out: &mut String, tokens: &[Token], base: usize) {
    for token in tokens {
        let indent = "  ".repeat(base + token.level);
        let _ = write!(out, "{indent}{}", token.kind);
        if !token.tag.is_empty() {
            let _ = write!(out, " <{}>", token.tag);
        }
        for (name, value) in &token.attrs {
            let _ = write!(out, " {name}={value:?}");
        }
        if !token.info.is_empty() {
            let _ = write!(out, " info={:?}", token.info);
        }
        let content = token.content_text();
        if !content.is_empty() {
            let _ = write!(out, " {content:?}");
        }
        if token.hidden {
            out.push_str(" (hidden)");
        }
        out.push('\n');
        if let Some(children) = &token.children {
            write_tokens(out, children, base + token.level + 1);
        }
    }
}
