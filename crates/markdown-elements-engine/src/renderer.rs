//! # Tree Builder
//!
//! Walks a token stream and builds the element tree.
//!
//! ## Walk
//!
//! `build_from` iterates from a start index and, per token:
//!
//! 1. **Close** (`-1`): stop and report the current index to the caller,
//!    unless the token is hidden
//! 2. **`inline`**: build the token's `children` in place, so their elements are
//!    keyed among the surrounding siblings
//! 3. **Rule**: dispatch to the rule table; a [`Rendered::Consumed`] result
//!    fast-forwards past every token it claimed
//! 4. **Hidden**: skip
//! 5. **Open** (`+1`): recurse for the body, wrap it in the token's tag, resume
//!    after the matching close
//! 6. **Self-closing** (`0`): emit an empty element
//!
//! Rule dispatch comes before the nesting-based handling, so a rule for a
//! container type replaces the generic wrapping entirely.
//!
//! ## Key Invariants
//!
//! - The token slice is never mutated; the index is threaded through return values
//! - An opening token without a matching close is closed at end of stream
//! - Hidden tokens neither open nor close a container
//! - A token with an empty tag produces no element of its own
//! - Keys are assigned once per finished sibling sequence
//! - Recursion depth equals the maximum nesting depth of the stream

use std::fmt;

use crate::attrs::get_attrs;
use crate::error::RenderError;
use crate::flatten::{append_unkeyed, flatten};
use crate::html;
use crate::node::{Element, Node};
use crate::options::RenderOptions;
use crate::rules::{Rendered, RenderedToken, RuleTable, defaults::default_rules};
use crate::token::{Nesting, Token};

/// Renders token streams into element trees.
///
/// `E` is an opaque environment value handed to every rule.
pub struct Renderer<E = ()> {
    rules: RuleTable<E>,
}

impl<E: 'static> Renderer<E> {
    /// A renderer with only the default rules.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// A renderer whose rules are `inherited` overlaid with the defaults.
    ///
    /// Defaults win on a name collision, so the built-in behaviour is always
    /// in effect for its token types.
    pub fn with_inherited(inherited: RuleTable<E>) -> Self {
        Self {
            rules: RuleTable::merge(Some(&inherited), &default_rules()),
        }
    }

    /// A renderer layered on top of another renderer's rules.
    pub fn layered_on(other: &Renderer<E>) -> Self {
        Self::with_inherited(other.rules.clone())
    }
}

impl<E> Renderer<E> {
    pub fn rules(&self) -> &RuleTable<E> {
        &self.rules
    }

    /// Renders a whole stream; the result is a fragment of the top-level nodes.
    pub fn render(
        &self,
        tokens: &[Token],
        options: &RenderOptions,
        env: &E,
    ) -> Result<Node, RenderError> {
        self.render_nodes(tokens, options, env).map(Node::Fragment)
    }

    /// Renders a whole stream into its flattened, keyed top-level nodes.
    pub fn render_nodes(
        &self,
        tokens: &[Token],
        options: &RenderOptions,
        env: &E,
    ) -> Result<Vec<Node>, RenderError> {
        let (nodes, _) = self.build_from(tokens, 0, options, env)?;
        Ok(flatten(Node::Fragment(nodes)))
    }

    /// Renders a stream and serialises the result as HTML.
    pub fn render_html(
        &self,
        tokens: &[Token],
        options: &RenderOptions,
        env: &E,
    ) -> Result<String, RenderError> {
        let node = self.render(tokens, options, env)?;
        Ok(html::to_html(&node, options.xhtml_out))
    }

    /// Renders exactly the token at `idx` with the generic nesting handling.
    ///
    /// An opening token consumes its body; the returned `end` is the index of
    /// its matching close (or the stream length if it has none). A closing
    /// token yields no node.
    pub fn render_token(
        &self,
        tokens: &[Token],
        idx: usize,
        options: &RenderOptions,
        env: &E,
    ) -> Result<RenderedToken, RenderError> {
        let token = tokens.get(idx).ok_or(RenderError::IndexOutOfRange {
            index: idx,
            len: tokens.len(),
        })?;

        match token.nesting {
            Nesting::Open => {
                let (children, end) = self.build_from(tokens, idx + 1, options, env)?;
                Ok(RenderedToken::new(container(token, children), end))
            }
            Nesting::SelfClosing => Ok(RenderedToken::new(singleton(token), idx)),
            Nesting::Close => Ok(RenderedToken::new(Node::Empty, idx)),
        }
    }

    /// Plain-text rendering of an inline stream, as used for image alt text.
    pub fn render_inline_as_text(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            match token.kind.as_str() {
                "text" | "html_inline" | "html_block" => out.push_str(&token.content_text()),
                "image" => out.push_str(
                    &self.render_inline_as_text(token.children.as_deref().unwrap_or_default()),
                ),
                "softbreak" | "hardbreak" => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    /// Builds nodes from `start` until a closing token or the end of the stream.
    ///
    /// Returns the nodes and the index where this level stopped: the closing
    /// token's index, or `tokens.len()`. The nodes are flat but not yet keyed;
    /// the caller keys them once the sequence is complete.
    fn build_from(
        &self,
        tokens: &[Token],
        start: usize,
        options: &RenderOptions,
        env: &E,
    ) -> Result<(Vec<Node>, usize), RenderError> {
        let mut nodes = Vec::new();
        let mut i = start;

        while i < tokens.len() {
            let token = &tokens[i];

            // Tight lists hide paragraph closes; those must not end the item.
            if token.nesting == Nesting::Close && !token.hidden {
                return Ok((nodes, i));
            }

            if token.kind == "inline" {
                let children = token.children.as_deref().unwrap_or_default();
                let (inline, _) = self.build_from(children, 0, options, env)?;
                nodes.extend(inline);
            } else if let Some(rule) = self.rules.get(&token.kind) {
                log::trace!("rule `{}` at token {i}", token.kind);
                match rule(tokens, i, options, env, self)? {
                    Rendered::Node(node) => append_unkeyed(&mut nodes, node),
                    Rendered::Consumed(RenderedToken { node, end }) => {
                        if end < i || end > tokens.len() {
                            return Err(RenderError::EndIndexOutOfRange {
                                kind: token.kind.clone(),
                                index: i,
                                end,
                                len: tokens.len(),
                            });
                        }
                        append_unkeyed(&mut nodes, node);
                        i = end;
                    }
                }
            } else if token.hidden {
                log::trace!("skipping hidden `{}` at token {i}", token.kind);
            } else if token.nesting == Nesting::Open {
                let (children, end) = self.build_from(tokens, i + 1, options, env)?;
                if end == tokens.len() {
                    log::debug!(
                        "`{}` at token {i} has no closing token, closing at end of stream",
                        token.kind
                    );
                }
                append_unkeyed(&mut nodes, container(token, children));
                i = end;
            } else {
                append_unkeyed(&mut nodes, singleton(token));
            }

            i += 1;
        }

        Ok((nodes, tokens.len()))
    }
}

impl<E: 'static> Default for Renderer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Renderer<E> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<E> fmt::Debug for Renderer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("rules", &self.rules)
            .finish()
    }
}

/// Generic element for an opening token; a tagless token yields its children.
fn container(token: &Token, children: Vec<Node>) -> Node {
    if token.tag.is_empty() {
        return Node::Fragment(children);
    }
    Element::new(token.tag.as_str())
        .with_props(get_attrs(token))
        .with_children(children)
        .into()
}

fn singleton(token: &Token) -> Node {
    if token.tag.is_empty() {
        return Node::Empty;
    }
    Element::new(token.tag.as_str())
        .with_props(get_attrs(token))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Key;
    use pretty_assertions::assert_eq;

    fn open(kind: &str, tag: &str) -> Token {
        Token::new(format!("{kind}_open"), tag, Nesting::Open)
    }

    fn close(kind: &str, tag: &str) -> Token {
        Token::new(format!("{kind}_close"), tag, Nesting::Close)
    }

    fn stop_index(tokens: &[Token]) -> usize {
        let renderer = Renderer::<()>::new();
        renderer
            .build_from(tokens, 0, &RenderOptions::default(), &())
            .unwrap()
            .1
    }

    #[test]
    fn balanced_stream_is_consumed_entirely() {
        let tokens = vec![
            open("blockquote", "blockquote"),
            open("paragraph", "p"),
            Token::inline(vec![Token::text("quoted")]),
            close("paragraph", "p"),
            close("blockquote", "blockquote"),
            Token::new("hr", "hr", Nesting::SelfClosing),
        ];
        assert_eq!(stop_index(&tokens), tokens.len());
    }

    #[test]
    fn empty_stream_renders_nothing() {
        assert_eq!(stop_index(&[]), 0);
        let nodes = Renderer::<()>::new()
            .render_nodes(&[], &RenderOptions::default(), &())
            .unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn stray_close_stops_the_top_level() {
        let tokens = vec![
            Token::text("a"),
            close("paragraph", "p"),
            Token::text("b"),
        ];
        assert_eq!(stop_index(&tokens), 1);
    }

    #[test]
    fn generic_containers_use_token_tag_and_attrs() {
        let tokens = vec![
            open("link", "a").with_attr("href", "/x"),
            Token::text("go"),
            close("link", "a"),
        ];
        let nodes = Renderer::<()>::new()
            .render_nodes(&tokens, &RenderOptions::default(), &())
            .unwrap();
        assert_eq!(
            nodes,
            vec![Node::from(
                Element::new("a")
                    .with_key(Key::Index(0))
                    .with_prop("href", "/x")
                    .with_child("go")
            )]
        );
    }

    #[test]
    fn hidden_tokens_are_skipped_but_their_content_is_not() {
        // Tight list items hide their paragraphs.
        let item = |text: &str| {
            vec![
                open("list_item", "li"),
                open("paragraph", "p").hidden(),
                Token::inline(vec![Token::text(text)]),
                close("paragraph", "p").hidden(),
                close("list_item", "li"),
            ]
        };
        let mut tokens = vec![open("bullet_list", "ul")];
        tokens.extend(item("one"));
        tokens.extend(item("two"));
        tokens.push(close("bullet_list", "ul"));

        assert_eq!(stop_index(&tokens), tokens.len());
        let nodes = Renderer::<()>::new()
            .render_nodes(&tokens, &RenderOptions::default(), &())
            .unwrap();
        assert_eq!(
            nodes,
            vec![Node::from(
                Element::new("ul")
                    .with_key(Key::Index(0))
                    .with_child(Element::new("li").with_key(Key::Index(0)).with_child("one"))
                    .with_child(Element::new("li").with_key(Key::Index(1)).with_child("two"))
            )]
        );
    }

    #[test]
    fn inline_elements_are_keyed_after_preceding_siblings() {
        let tokens = vec![
            Token::new("hr", "hr", Nesting::SelfClosing),
            Token::inline(vec![
                open("em", "em"),
                Token::text("x"),
                close("em", "em"),
            ]),
        ];
        let nodes = Renderer::<()>::new()
            .render_nodes(&tokens, &RenderOptions::default(), &())
            .unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::from(Element::new("hr").with_key(Key::Index(0))),
                Node::from(Element::new("em").with_key(Key::Index(1)).with_child("x")),
            ]
        );
    }

    #[test]
    fn tagless_tokens_contribute_only_their_children() {
        let tokens = vec![
            Token::new("section_open", "", Nesting::Open),
            Token::new("anchor", "", Nesting::SelfClosing),
            Token::new("hr", "hr", Nesting::SelfClosing),
            Token::new("section_close", "", Nesting::Close),
        ];
        let nodes = Renderer::<()>::new()
            .render_nodes(&tokens, &RenderOptions::default(), &())
            .unwrap();
        assert_eq!(
            nodes,
            vec![Node::from(Element::new("hr").with_key(Key::Index(0)))]
        );
    }

    #[test]
    fn render_token_open_returns_matching_close() {
        let tokens = vec![
            open("strong", "strong"),
            Token::text("x"),
            close("strong", "strong"),
            Token::text("after"),
        ];
        let rendered = Renderer::<()>::new()
            .render_token(&tokens, 0, &RenderOptions::default(), &())
            .unwrap();
        assert_eq!(rendered.end, 2);
        assert_eq!(
            rendered.node,
            Node::from(Element::new("strong").with_child("x"))
        );
    }

    #[test]
    fn render_token_self_closing_and_close() {
        let tokens = vec![
            Token::new("hr", "hr", Nesting::SelfClosing),
            close("paragraph", "p"),
        ];
        let renderer = Renderer::<()>::new();
        let options = RenderOptions::default();

        let hr = renderer.render_token(&tokens, 0, &options, &()).unwrap();
        assert_eq!(hr, RenderedToken::new(Element::new("hr"), 0));

        let closed = renderer.render_token(&tokens, 1, &options, &()).unwrap();
        assert_eq!(closed, RenderedToken::new(Node::Empty, 1));
    }

    #[test]
    fn render_token_rejects_bad_index() {
        let err = Renderer::<()>::new()
            .render_token(&[], 3, &RenderOptions::default(), &())
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::IndexOutOfRange { index: 3, len: 0 }
        ));
    }

    #[test]
    fn inline_as_text_keeps_only_textual_tokens() {
        let renderer = Renderer::<()>::new();
        let tokens = vec![
            Token::text("a"),
            Token::new("code_inline", "code", Nesting::SelfClosing).with_content("ignored"),
            Token::new("html_inline", "", Nesting::SelfClosing).with_content("<i>"),
            Token::new("hardbreak", "br", Nesting::SelfClosing),
            Token::new("image", "img", Nesting::SelfClosing)
                .with_children(vec![Token::text("nested")]),
        ];
        assert_eq!(renderer.render_inline_as_text(&tokens), "a<i>\nnested");
    }

    #[test]
    fn layered_renderer_keeps_foreign_rules_but_not_overrides_of_defaults() {
        let base = Renderer::with_inherited(
            RuleTable::<()>::new()
                .with("emoji", |_, _, _, _, _| Ok(Rendered::from(":)")))
                .with("text", |_, _, _, _, _| Ok(Rendered::from("shadowed"))),
        );
        let layered = Renderer::layered_on(&base);

        assert!(layered.rules().contains("emoji"));
        let tokens = vec![
            Token::new("emoji", "", Nesting::SelfClosing),
            Token::text("plain"),
        ];
        let nodes = layered
            .render_nodes(&tokens, &RenderOptions::default(), &())
            .unwrap();
        assert_eq!(nodes, vec![Node::text(":)"), Node::text("plain")]);
    }
}
