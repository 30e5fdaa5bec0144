//! # Token Stream Adapter
//!
//! Turns pulldown-cmark events into the flat, nesting-annotated token stream
//! the renderer consumes.
//!
//! Block structure becomes `*_open` / `*_close` pairs at the top level. The
//! inline content of each paragraph, heading or table cell is grouped into a
//! single `inline` token whose `children` hold the inline stream. Text that
//! shows up directly in a list item (a tight list) is wrapped in a hidden
//! paragraph, so the item renders its text without a `<p>`.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};

use markdown_elements_engine::{Nesting, Node, Token};

/// Tokenizes `source` with the given pulldown-cmark extensions.
pub fn tokenize(source: &str, options: Options) -> Vec<Token> {
    let mut tokenizer = Tokenizer::default();
    for event in Parser::new_ext(source, options) {
        tokenizer.event(event);
    }
    tokenizer.finish()
}

/// A block container that is currently open.
struct Block {
    name: &'static str,
    tag: String,
}

/// Inline tokens collected for the innermost inline-bearing block.
struct InlineRun {
    children: Vec<Token>,
    /// Opened by a hidden paragraph rather than an explicit block.
    implicit: bool,
}

/// Raw text block being accumulated (fenced/indented code or HTML).
struct RawBlock {
    token: Token,
    text: String,
}

#[derive(Default)]
struct Tokenizer {
    tokens: Vec<Token>,
    blocks: Vec<Block>,
    inline: Option<InlineRun>,
    /// Images being built; their inline content becomes alt-text children.
    images: Vec<Token>,
    raw: Option<RawBlock>,
    alignments: Vec<Alignment>,
    in_table_head: bool,
    cell: usize,
}

impl Tokenizer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(raw) = &mut self.raw {
                    raw.text.push_str(&text);
                } else {
                    self.push_inline(Token::text(text.to_string()));
                }
            }
            Event::Code(code) => self.push_inline(
                Token::new("code_inline", "code", Nesting::SelfClosing)
                    .with_content(code.to_string())
                    .with_markup("`"),
            ),
            Event::Html(html) => match &mut self.raw {
                Some(raw) => raw.text.push_str(&html),
                None => {
                    self.flush_inline();
                    let token = Token::new("html_block", "", Nesting::SelfClosing)
                        .with_content(html.to_string());
                    self.push_block(token);
                }
            },
            Event::InlineHtml(html) => self.push_inline(
                Token::new("html_inline", "", Nesting::SelfClosing).with_content(html.to_string()),
            ),
            Event::SoftBreak => {
                self.push_inline(Token::new("softbreak", "br", Nesting::SelfClosing))
            }
            Event::HardBreak => {
                self.push_inline(Token::new("hardbreak", "br", Nesting::SelfClosing))
            }
            Event::Rule => {
                self.flush_inline();
                self.push_block(Token::new("hr", "hr", Nesting::SelfClosing).with_markup("---"));
            }
            Event::TaskListMarker(checked) => {
                let mut marker = Token::new("task_list_marker", "input", Nesting::SelfClosing)
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    marker = marker.with_attr("checked", "");
                }
                self.push_inline(marker);
            }
            Event::FootnoteReference(label) => {
                for token in footnote_ref(&label) {
                    self.push_inline(token);
                }
            }
            other => log::trace!("ignoring event {other:?}"),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.open_block("paragraph", "p", Vec::new());
                self.begin_inline(false);
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut pairs = Vec::new();
                if let Some(id) = id {
                    pairs.push(("id".to_string(), id.to_string()));
                }
                if !classes.is_empty() {
                    let classes: Vec<_> = classes.iter().map(|c| c.to_string()).collect();
                    pairs.push(("class".to_string(), classes.join(" ")));
                }
                for (name, value) in attrs {
                    let value = value.map(|v| v.to_string()).unwrap_or_default();
                    pairs.push((name.to_string(), value));
                }
                self.open_block("heading", &format!("h{}", level as usize), pairs);
                self.begin_inline(false);
            }
            Tag::BlockQuote(_) => self.open_block("blockquote", "blockquote", Vec::new()),
            Tag::List(Some(start)) => {
                let attrs = if start == 1 {
                    Vec::new()
                } else {
                    vec![("start".to_string(), start.to_string())]
                };
                self.open_block("ordered_list", "ol", attrs);
            }
            Tag::List(None) => self.open_block("bullet_list", "ul", Vec::new()),
            Tag::Item => self.open_block("list_item", "li", Vec::new()),
            Tag::FootnoteDefinition(label) => {
                let attrs = vec![
                    ("class".to_string(), "footnote-item".to_string()),
                    ("id".to_string(), format!("fn-{label}")),
                ];
                self.open_block("footnote", "div", attrs);
            }
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.open_block("table", "table", Vec::new());
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell = 0;
                self.open_block("thead", "thead", Vec::new());
                self.open_block("tr", "tr", Vec::new());
            }
            Tag::TableRow => {
                if !self.blocks.iter().any(|b| b.name == "tbody") {
                    self.open_block("tbody", "tbody", Vec::new());
                }
                self.cell = 0;
                self.open_block("tr", "tr", Vec::new());
            }
            Tag::TableCell => {
                let (name, tag) = if self.in_table_head {
                    ("th", "th")
                } else {
                    ("td", "td")
                };
                let attrs = match self.alignments.get(self.cell) {
                    Some(Alignment::Left) => vec![style_align("left")],
                    Some(Alignment::Center) => vec![style_align("center")],
                    Some(Alignment::Right) => vec![style_align("right")],
                    _ => Vec::new(),
                };
                self.cell += 1;
                self.open_block(name, tag, attrs);
                self.begin_inline(false);
            }
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                let token = match kind {
                    CodeBlockKind::Fenced(info) => Token::new("fence", "code", Nesting::SelfClosing)
                        .with_info(info.to_string())
                        .with_markup("```"),
                    CodeBlockKind::Indented => {
                        Token::new("code_block", "code", Nesting::SelfClosing)
                    }
                };
                self.raw = Some(RawBlock {
                    token,
                    text: String::new(),
                });
            }
            Tag::HtmlBlock => {
                self.flush_inline();
                self.raw = Some(RawBlock {
                    token: Token::new("html_block", "", Nesting::SelfClosing),
                    text: String::new(),
                });
            }
            Tag::Emphasis => self.push_inline(Token::new("em_open", "em", Nesting::Open)),
            Tag::Strong => self.push_inline(Token::new("strong_open", "strong", Nesting::Open)),
            Tag::Strikethrough => self.push_inline(Token::new("s_open", "s", Nesting::Open)),
            Tag::Superscript => self.push_inline(Token::new("sup_open", "sup", Nesting::Open)),
            Tag::Subscript => self.push_inline(Token::new("sub_open", "sub", Nesting::Open)),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = match link_type {
                    LinkType::Email => format!("mailto:{dest_url}"),
                    _ => dest_url.to_string(),
                };
                let mut token = Token::new("link_open", "a", Nesting::Open).with_attr("href", href);
                if !title.is_empty() {
                    token = token.with_attr("title", title.to_string());
                }
                self.push_inline(token);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut token = Token::new("image", "img", Nesting::SelfClosing)
                    .with_attr("src", dest_url.to_string())
                    .with_attr("alt", "");
                if !title.is_empty() {
                    token = token.with_attr("title", title.to_string());
                }
                self.images.push(token.with_children(Vec::new()));
            }
            other => log::trace!("ignoring start of {other:?}"),
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::FootnoteDefinition
            | TagEnd::TableRow
            | TagEnd::TableCell => self.close_block(),
            TagEnd::TableHead => {
                self.close_until("thead");
                self.in_table_head = false;
            }
            TagEnd::Table => {
                self.close_until("table");
                self.alignments.clear();
            }
            TagEnd::CodeBlock | TagEnd::HtmlBlock => {
                if let Some(RawBlock { token, text }) = self.raw.take() {
                    self.push_block(token.with_content(text));
                }
            }
            TagEnd::Emphasis => self.push_inline(Token::new("em_close", "em", Nesting::Close)),
            TagEnd::Strong => {
                self.push_inline(Token::new("strong_close", "strong", Nesting::Close))
            }
            TagEnd::Strikethrough => self.push_inline(Token::new("s_close", "s", Nesting::Close)),
            TagEnd::Superscript => {
                self.push_inline(Token::new("sup_close", "sup", Nesting::Close))
            }
            TagEnd::Subscript => self.push_inline(Token::new("sub_close", "sub", Nesting::Close)),
            TagEnd::Link => self.push_inline(Token::new("link_close", "a", Nesting::Close)),
            TagEnd::Image => {
                if let Some(image) = self.images.pop() {
                    self.push_inline(image);
                }
            }
            other => log::trace!("ignoring end of {other:?}"),
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.close_until_empty();
        self.tokens
    }

    fn depth(&self) -> usize {
        self.blocks.len()
    }

    fn push_block(&mut self, token: Token) {
        let level = self.depth();
        self.tokens.push(token.with_level(level).block());
    }

    fn open_block(&mut self, name: &'static str, tag: &str, attrs: Vec<(String, String)>) {
        self.flush_inline();
        let mut token = Token::new(format!("{name}_open"), tag, Nesting::Open);
        token.attrs = attrs;
        self.push_block(token);
        self.blocks.push(Block {
            name,
            tag: tag.to_string(),
        });
    }

    fn close_block(&mut self) {
        self.flush_inline();
        if let Some(Block { name, tag }) = self.blocks.pop() {
            self.push_block(Token::new(format!("{name}_close"), tag, Nesting::Close));
        }
    }

    /// Closes blocks up to and including the innermost `name`.
    fn close_until(&mut self, name: &str) {
        while let Some(block) = self.blocks.last() {
            let done = block.name == name;
            self.close_block();
            if done {
                break;
            }
        }
    }

    fn close_until_empty(&mut self) {
        self.flush_inline();
        while !self.blocks.is_empty() {
            self.close_block();
        }
    }

    fn begin_inline(&mut self, implicit: bool) {
        self.inline = Some(InlineRun {
            children: Vec::new(),
            implicit,
        });
    }

    /// Emits the pending `inline` token, closing its hidden paragraph if any.
    fn flush_inline(&mut self) {
        let Some(run) = self.inline.take() else {
            return;
        };
        let level = self.depth() + usize::from(run.implicit);
        self.tokens
            .push(Token::inline(run.children).with_level(level).block());
        if run.implicit {
            self.push_block(Token::new("paragraph_close", "p", Nesting::Close).hidden());
        }
    }

    fn push_inline(&mut self, token: Token) {
        if let Some(image) = self.images.last_mut() {
            image.children.get_or_insert_with(Vec::new).push(token);
            return;
        }
        if self.inline.is_none() {
            self.push_block(Token::new("paragraph_open", "p", Nesting::Open).hidden());
            self.begin_inline(true);
        }
        if let Some(run) = &mut self.inline {
            push_merging_text(&mut run.children, token);
        }
    }
}

/// Pushes `token`, joining it onto a preceding text token.
fn push_merging_text(children: &mut Vec<Token>, token: Token) {
    if token.kind == "text"
        && let Some(last) = children.last_mut()
        && last.kind == "text"
        && let (Node::Text(prev), Node::Text(next)) = (&mut last.content, &token.content)
    {
        prev.push_str(next);
        return;
    }
    children.push(token);
}

fn style_align(align: &str) -> (String, String) {
    ("style".to_string(), format!("text-align:{align}"))
}

fn footnote_ref(label: &str) -> Vec<Token> {
    vec![
        Token::new("footnote_ref_open", "sup", Nesting::Open).with_attr("class", "footnote-ref"),
        Token::new("link_open", "a", Nesting::Open)
            .with_attr("href", format!("#fn-{label}"))
            .with_attr("id", format!("fnref-{label}")),
        Token::text(format!("[{label}]")),
        Token::new("link_close", "a", Nesting::Close),
        Token::new("footnote_ref_close", "sup", Nesting::Close),
    ]
}
