//! Built-in rules, mirroring the stock HTML renderer of markdown-it but
//! producing elements instead of strings.

use crate::attrs::get_attrs;
use crate::error::RenderError;
use crate::html::{escape_html, unescape_all};
use crate::node::{Element, Node};
use crate::options::RenderOptions;
use crate::renderer::Renderer;
use crate::token::Token;

use super::{Rendered, RuleTable};

/// The default rule set.
pub fn default_rules<E: 'static>() -> RuleTable<E> {
    let mut rules = RuleTable::new();
    rules.insert("code_inline", code_inline::<E>);
    rules.insert("code_block", code_block::<E>);
    rules.insert("fence", fence::<E>);
    rules.insert("image", image::<E>);
    rules.insert("hardbreak", hardbreak::<E>);
    rules.insert("softbreak", softbreak::<E>);
    rules.insert("text", verbatim::<E>);
    rules.insert("html_block", verbatim::<E>);
    rules.insert("html_inline", verbatim::<E>);
    rules
}

pub fn code_inline<E>(
    tokens: &[Token],
    idx: usize,
    _options: &RenderOptions,
    _env: &E,
    _renderer: &Renderer<E>,
) -> Result<Rendered, RenderError> {
    let token = &tokens[idx];
    Ok(Element::new("code")
        .with_props(get_attrs(token))
        .with_child(token.content.clone())
        .into())
}

/// Indented code block.
pub fn code_block<E>(
    tokens: &[Token],
    idx: usize,
    _options: &RenderOptions,
    _env: &E,
    _renderer: &Renderer<E>,
) -> Result<Rendered, RenderError> {
    let token = &tokens[idx];
    Ok(Element::new("pre")
        .with_props(get_attrs(token))
        .with_child(Element::new("code").with_child(token.content.clone()))
        .into())
}

/// Fenced code block, optionally run through `options.highlight`.
pub fn fence<E>(
    tokens: &[Token],
    idx: usize,
    options: &RenderOptions,
    _env: &E,
    _renderer: &Renderer<E>,
) -> Result<Rendered, RenderError> {
    let token = &tokens[idx];
    let info = unescape_all(&token.info).trim().to_string();
    let lang_name = info.split_whitespace().next().unwrap_or_default();
    let content = token.content_text();

    let highlighted = match &options.highlight {
        Some(highlight) => highlight(&content, lang_name)
            .map_err(|source| RenderError::Highlight {
                lang: lang_name.to_string(),
                source,
            })?
            .filter(|out| !out.is_empty()),
        None => None,
    }
    .unwrap_or_else(|| escape_html(&content));

    // The highlighter already produced a whole block.
    if highlighted.starts_with("<pre") {
        return Ok(Element::new("div").with_inner_html(highlighted).into());
    }

    let mut attrs = get_attrs(token);
    if !info.is_empty() {
        let lang_class = format!("{}{}", options.lang_prefix, lang_name);
        let class = class_names(&[
            attrs.get("class").map(String::as_str),
            Some(lang_class.as_str()),
        ]);
        attrs.insert("class".to_string(), class);
    }

    Ok(Element::new("pre")
        .with_child(
            Element::new("code")
                .with_props(attrs)
                .with_inner_html(highlighted),
        )
        .into())
}

/// Image with its inline children flattened to text as the `alt` attribute.
pub fn image<E>(
    tokens: &[Token],
    idx: usize,
    _options: &RenderOptions,
    _env: &E,
    renderer: &Renderer<E>,
) -> Result<Rendered, RenderError> {
    let token = &tokens[idx];
    let alt = renderer.render_inline_as_text(token.children.as_deref().unwrap_or_default());

    Ok(Element::new(token.tag.as_str())
        .with_props(get_attrs(token))
        .with_prop("alt", alt)
        .into())
}

pub fn hardbreak<E>(
    _tokens: &[Token],
    _idx: usize,
    _options: &RenderOptions,
    _env: &E,
    _renderer: &Renderer<E>,
) -> Result<Rendered, RenderError> {
    Ok(line_break().into())
}

pub fn softbreak<E>(
    _tokens: &[Token],
    _idx: usize,
    options: &RenderOptions,
    _env: &E,
    _renderer: &Renderer<E>,
) -> Result<Rendered, RenderError> {
    if options.breaks {
        Ok(line_break().into())
    } else {
        Ok(Node::text("\n").into())
    }
}

/// Text, `html_block` and `html_inline`: the content, untouched.
pub fn verbatim<E>(
    tokens: &[Token],
    idx: usize,
    _options: &RenderOptions,
    _env: &E,
    _renderer: &Renderer<E>,
) -> Result<Rendered, RenderError> {
    Ok(tokens[idx].content.clone().into())
}

fn line_break() -> Vec<Node> {
    vec![Element::new("br").into(), Node::text("\n")]
}

/// Joins the non-empty class names with a space.
fn class_names(names: &[Option<&str>]) -> String {
    names
        .iter()
        .flatten()
        .filter(|name| !name.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Key;
    use crate::token::Nesting;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render_one(token: Token, options: &RenderOptions) -> Vec<Node> {
        let renderer = Renderer::new();
        renderer.render_nodes(&[token], options, &()).unwrap()
    }

    fn fence_token(info: &str, content: &str) -> Token {
        Token::new("fence", "code", Nesting::SelfClosing)
            .with_info(info)
            .with_content(content)
    }

    #[test]
    fn code_inline_keeps_content_verbatim() {
        let token = Token::new("code_inline", "code", Nesting::SelfClosing)
            .with_content("x<1")
            .with_attr("class", "tt");
        let nodes = render_one(token, &RenderOptions::default());

        assert_eq!(
            nodes,
            vec![Node::from(
                Element::new("code")
                    .with_key(Key::Index(0))
                    .with_prop("class", "tt")
                    .with_child("x<1")
            )]
        );
    }

    #[test]
    fn code_block_puts_attrs_on_pre() {
        let token = Token::new("code_block", "code", Nesting::SelfClosing)
            .with_content("let x = 1;\n")
            .with_attr("data-line", "3");
        let nodes = render_one(token, &RenderOptions::default());

        let pre = nodes[0].as_element().unwrap();
        assert_eq!(pre.tag, "pre");
        assert_eq!(pre.prop("data-line"), Some("3"));
        let code = pre.children[0].as_element().unwrap();
        assert_eq!(code.tag, "code");
        assert!(code.props.is_empty());
        assert_eq!(code.children, vec![Node::text("let x = 1;\n")]);
    }

    #[test]
    fn fence_without_info_escapes_content() {
        let nodes = render_one(fence_token("", "a < b\n"), &RenderOptions::default());

        let pre = nodes[0].as_element().unwrap();
        let code = pre.children[0].as_element().unwrap();
        assert_eq!(code.inner_html.as_deref(), Some("a &lt; b\n"));
        assert_eq!(code.prop("class"), None);
    }

    #[test]
    fn fence_with_info_adds_language_class() {
        let token = fence_token("rust ignore", "fn main() {}\n").with_attr("class", "listing");
        let options = RenderOptions::default().with_lang_prefix("lang-");
        let nodes = render_one(token, &options);

        let code = nodes[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        assert_eq!(code.prop("class"), Some("listing lang-rust"));
    }

    #[test]
    fn fence_info_is_unescaped() {
        let nodes = render_one(fence_token(r"c\+\+", "int x;\n"), &RenderOptions::default());
        let code = nodes[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        assert_eq!(code.prop("class"), Some("language-c++"));
    }

    #[test]
    fn fence_passes_code_and_language_to_highlighter() {
        let options = RenderOptions::default()
            .with_highlighter(|code, lang| Ok(Some(format!("<b>{lang}</b>{}", code.len()))));
        let nodes = render_one(fence_token("py", "print()\n"), &options);

        let code = nodes[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        assert_eq!(code.inner_html.as_deref(), Some("<b>py</b>8"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(String::new()))]
    fn fence_falls_back_when_highlighter_returns_nothing(#[case] result: Option<String>) {
        let options = RenderOptions::default().with_highlighter(move |_, _| Ok(result.clone()));
        let nodes = render_one(fence_token("js", "a && b"), &options);

        let code = nodes[0].as_element().unwrap().children[0]
            .as_element()
            .unwrap();
        assert_eq!(code.inner_html.as_deref(), Some("a &amp;&amp; b"));
    }

    #[test]
    fn fence_highlighted_block_is_not_double_wrapped() {
        let options = RenderOptions::default()
            .with_highlighter(|_, _| Ok(Some("<pre class=\"hl\"><code>x</code></pre>".into())));
        let nodes = render_one(fence_token("js", "x"), &options);

        let div = nodes[0].as_element().unwrap();
        assert_eq!(div.tag, "div");
        assert!(div.children.is_empty());
        assert_eq!(
            div.inner_html.as_deref(),
            Some("<pre class=\"hl\"><code>x</code></pre>")
        );
    }

    #[test]
    fn fence_highlighter_error_propagates() {
        let options =
            RenderOptions::default().with_highlighter(|_, _| Err(anyhow::anyhow!("grammar missing")));
        let err = Renderer::new()
            .render_nodes(&[fence_token("zig", "x")], &options, &())
            .unwrap_err();

        assert!(matches!(err, RenderError::Highlight { ref lang, .. } if lang == "zig"));
        assert!(err.to_string().contains("grammar missing"));
    }

    #[test]
    fn image_alt_is_plain_text_of_children() {
        let token = Token::new("image", "img", Nesting::SelfClosing)
            .with_attr("src", "cat.png")
            .with_attr("alt", "")
            .with_children(vec![
                Token::text("a "),
                Token::new("em_open", "em", Nesting::Open),
                Token::text("fat"),
                Token::new("em_close", "em", Nesting::Close),
                Token::new("softbreak", "br", Nesting::SelfClosing),
                Token::text("cat"),
            ]);
        let nodes = render_one(token, &RenderOptions::default());

        let img = nodes[0].as_element().unwrap();
        assert_eq!(img.tag, "img");
        assert_eq!(img.prop("src"), Some("cat.png"));
        assert_eq!(img.prop("alt"), Some("a fat\ncat"));
        assert!(img.children.is_empty());
    }

    #[test]
    fn hardbreak_is_br_then_newline() {
        let token = Token::new("hardbreak", "br", Nesting::SelfClosing);
        let nodes = render_one(token, &RenderOptions::default());
        assert_eq!(
            nodes,
            vec![
                Element::new("br").with_key(Key::Index(0)).into(),
                Node::text("\n")
            ]
        );
    }

    #[rstest]
    #[case(false, vec![Node::text("\n")])]
    #[case(true, vec![Element::new("br").with_key(Key::Index(0)).into(), Node::text("\n")])]
    fn softbreak_depends_on_breaks_option(#[case] breaks: bool, #[case] expected: Vec<Node>) {
        let token = Token::new("softbreak", "br", Nesting::SelfClosing);
        let nodes = render_one(token, &RenderOptions::default().with_breaks(breaks));
        assert_eq!(nodes, expected);
    }

    #[rstest]
    #[case("text")]
    #[case("html_block")]
    #[case("html_inline")]
    fn verbatim_rules_return_content_unchanged(#[case] kind: &str) {
        let token = Token::new(kind, "", Nesting::SelfClosing).with_content("<b>raw</b> & co");
        let nodes = render_one(token, &RenderOptions::default());
        assert_eq!(nodes, vec![Node::text("<b>raw</b> & co")]);
    }

    #[test]
    fn content_may_be_a_rendered_node() {
        let token = Token::text("").with_content(Element::new("mark").with_child("hi"));
        let nodes = render_one(token, &RenderOptions::default());
        assert_eq!(
            nodes,
            vec![Node::from(
                Element::new("mark").with_key(Key::Index(0)).with_child("hi")
            )]
        );
    }

    #[test]
    fn class_names_skips_missing_and_empty() {
        assert_eq!(class_names(&[None, Some("language-rs")]), "language-rs");
        assert_eq!(class_names(&[Some(""), Some("b")]), "b");
        assert_eq!(class_names(&[Some("a"), Some("b")]), "a b");
    }
}
