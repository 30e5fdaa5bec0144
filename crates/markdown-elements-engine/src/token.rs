use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Nesting marker of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nesting {
    /// Opens a container (`+1`).
    Open,
    /// Self-contained item (`0`).
    SelfClosing,
    /// Closes the most recently opened container (`-1`).
    Close,
}

impl Nesting {
    pub fn level_delta(self) -> i32 {
        match self {
            Nesting::Open => 1,
            Nesting::SelfClosing => 0,
            Nesting::Close => -1,
        }
    }
}

impl TryFrom<i32> for Nesting {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Nesting::Open),
            0 => Ok(Nesting::SelfClosing),
            -1 => Ok(Nesting::Close),
            other => Err(other),
        }
    }
}

/// One element of a tokenizer's flat output stream.
///
/// Field meanings follow the markdown-it token model: `kind` selects the render
/// rule, `tag` is used when no rule exists, and `children` is only present on
/// `inline` tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: String,
    pub tag: String,
    pub nesting: Nesting,
    pub attrs: Vec<(String, String)>,
    pub children: Option<Vec<Token>>,
    /// Leaf payload; text in the common case, or an already rendered node.
    pub content: Node,
    /// Fence info string (`fence` tokens only).
    pub info: String,
    /// The markup that produced this token, e.g. "```" or "*".
    pub markup: String,
    /// Nesting level within the stream.
    pub level: usize,
    pub block: bool,
    pub hidden: bool,
}

impl Token {
    pub fn new(kind: impl Into<String>, tag: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            kind: kind.into(),
            tag: tag.into(),
            nesting,
            attrs: Vec::new(),
            children: None,
            content: Node::Empty,
            info: String::new(),
            markup: String::new(),
            level: 0,
            block: false,
            hidden: false,
        }
    }

    /// Shorthand for a `text` token.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new("text", "", Nesting::SelfClosing).with_content(Node::Text(content.into()))
    }

    /// Shorthand for an `inline` token wrapping `children`.
    pub fn inline(children: Vec<Token>) -> Self {
        let mut token = Self::new("inline", "", Nesting::SelfClosing);
        token.children = Some(children);
        token
    }

    pub fn with_content(mut self, content: impl Into<Node>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Token>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn block(mut self) -> Self {
        self.block = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Value of the last attribute named `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The content as plain text, flattening a node payload if necessary.
    pub fn content_text(&self) -> String {
        match &self.content {
            Node::Text(text) => text.clone(),
            other => other.text_content(),
        }
    }
}
