//! # Render Rules
//!
//! A rule turns the token at a given index into a node. Rules are looked up by
//! token type in a [`RuleTable`], which a renderer owns for its whole lifetime.
//!
//! A rule receives the renderer itself, so it can recurse into the tree
//! builder (e.g. the image rule renders its alt text through it). A rule that
//! wants to consume more than one token returns [`Rendered::Consumed`] with the
//! index of the last token it handled.

pub mod defaults;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RenderError;
use crate::node::{Element, Node};
use crate::options::RenderOptions;
use crate::renderer::Renderer;
use crate::token::Token;

/// A render rule: `(tokens, index, options, env, renderer) -> node`.
pub type Rule<E> = Arc<
    dyn Fn(&[Token], usize, &RenderOptions, &E, &Renderer<E>) -> Result<Rendered, RenderError>
        + Send
        + Sync,
>;

/// A node together with the index of the last token it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedToken {
    pub node: Node,
    pub end: usize,
}

impl RenderedToken {
    pub fn new(node: impl Into<Node>, end: usize) -> Self {
        Self {
            node: node.into(),
            end,
        }
    }
}

/// What a rule returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// A node for exactly the current token.
    Node(Node),
    /// A node claiming every token up to and including `end`.
    Consumed(RenderedToken),
}

impl From<Node> for Rendered {
    fn from(node: Node) -> Self {
        Rendered::Node(node)
    }
}

impl From<Element> for Rendered {
    fn from(el: Element) -> Self {
        Rendered::Node(Node::Element(el))
    }
}

impl From<String> for Rendered {
    fn from(text: String) -> Self {
        Rendered::Node(Node::Text(text))
    }
}

impl From<&str> for Rendered {
    fn from(text: &str) -> Self {
        Rendered::Node(Node::text(text))
    }
}

impl From<Vec<Node>> for Rendered {
    fn from(nodes: Vec<Node>) -> Self {
        Rendered::Node(Node::Fragment(nodes))
    }
}

impl From<RenderedToken> for Rendered {
    fn from(rendered: RenderedToken) -> Self {
        Rendered::Consumed(rendered)
    }
}

/// Mapping from token type to rule.
pub struct RuleTable<E> {
    rules: HashMap<String, Rule<E>>,
}

impl<E> RuleTable<E> {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registers `rule` for `kind`, replacing any previous rule.
    pub fn insert<F>(&mut self, kind: impl Into<String>, rule: F)
    where
        F: Fn(&[Token], usize, &RenderOptions, &E, &Renderer<E>) -> Result<Rendered, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.rules.insert(kind.into(), Arc::new(rule));
    }

    pub fn insert_rule(&mut self, kind: impl Into<String>, rule: Rule<E>) {
        self.rules.insert(kind.into(), rule);
    }

    pub fn with<F>(mut self, kind: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&[Token], usize, &RenderOptions, &E, &Renderer<E>) -> Result<Rendered, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(kind, rule);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&Rule<E>> {
        self.rules.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.rules.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered token types, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.rules.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Combines `inherited` with `overrides`; on a name collision the rule
    /// from `overrides` wins.
    pub fn merge(inherited: Option<&RuleTable<E>>, overrides: &RuleTable<E>) -> RuleTable<E> {
        let mut rules = inherited.map(|t| t.rules.clone()).unwrap_or_default();
        for (kind, rule) in &overrides.rules {
            rules.insert(kind.clone(), Arc::clone(rule));
        }
        RuleTable { rules }
    }
}

impl<E> Clone for RuleTable<E> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<E> Default for RuleTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for RuleTable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTable")
            .field("kinds", &self.kinds())
            .finish()
    }
}
