use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flatten::{append, flatten};

/// Element properties, one entry per attribute name.
pub type Props = BTreeMap<String, String>;

/// Identity key of an element within its sibling sequence.
///
/// Retained-mode UI trees use keys to match elements across rebuilds, so every
/// element in a sequence ends up with a key that is unique among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Position in the output sequence, assigned by the flattener.
    Index(usize),
    /// Explicit key chosen by whoever produced the element.
    Name(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

/// A structured element of the UI tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub key: Option<Key>,
    pub props: Props,
    /// Raw markup to inject as the element body instead of `children`.
    pub inner_html: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            props: Props::new(),
            inner_html: None,
            children: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = Some(html.into());
        self
    }

    /// Appends `child` the way the tree builder would: flattened and keyed.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        append(&mut self.children, child.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = flatten(Node::Fragment(children));
        self
    }

    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }
}

/// Anything a rule may produce.
///
/// `Empty` and `Bool` mean "no visual output" and are dropped when appended to
/// a sequence. `Fragment` is flattened into the surrounding sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Node {
    #[default]
    Empty,
    Bool(bool),
    Text(String),
    Number(f64),
    Element(Element),
    Fragment(Vec<Node>),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    ///
    /// Raw `inner_html` is not text and is skipped.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Empty | Node::Bool(_) => {}
            Node::Text(text) => out.push_str(text),
            Node::Number(n) => out.push_str(&n.to_string()),
            Node::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Node::Fragment(nodes) => nodes.iter().for_each(|c| c.collect_text(out)),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<Vec<Node>> for Node {
    fn from(nodes: Vec<Node>) -> Self {
        Node::Fragment(nodes)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Empty, Into::into)
    }
}
