//! # Markdown Facade
//!
//! Bundles the parser configuration, render options, plugins and renderer so a
//! caller can go from source text to an element tree in one call.

use std::fmt;
use std::str::FromStr;

use pulldown_cmark::Options;

use markdown_elements_engine::{
    Node, Plugin, RenderOptions, Renderer, Token, build_renderer, to_html,
};

use crate::error::MarkdownError;
use crate::strip_indent::strip_indent;
use crate::tokenize::tokenize;

/// Base set of parser extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// CommonMark plus tables and strikethrough.
    #[default]
    Default,
    /// Strict CommonMark.
    CommonMark,
}

impl Preset {
    pub fn options(self) -> Options {
        match self {
            Preset::Default => Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
            Preset::CommonMark => Options::empty(),
        }
    }
}

impl FromStr for Preset {
    type Err = MarkdownError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Preset::Default),
            "commonmark" => Ok(Preset::CommonMark),
            other => Err(MarkdownError::UnknownPreset(other.to_string())),
        }
    }
}

/// A parser extension that can be switched on or off by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Table,
    Strikethrough,
    TaskList,
    Footnote,
    SmartQuotes,
    HeadingAttrs,
}

impl Extension {
    pub const ALL: [Extension; 6] = [
        Extension::Table,
        Extension::Strikethrough,
        Extension::TaskList,
        Extension::Footnote,
        Extension::SmartQuotes,
        Extension::HeadingAttrs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Extension::Table => "table",
            Extension::Strikethrough => "strikethrough",
            Extension::TaskList => "tasklist",
            Extension::Footnote => "footnote",
            Extension::SmartQuotes => "smartquotes",
            Extension::HeadingAttrs => "heading_attrs",
        }
    }

    fn flag(self) -> Options {
        match self {
            Extension::Table => Options::ENABLE_TABLES,
            Extension::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            Extension::TaskList => Options::ENABLE_TASKLISTS,
            Extension::Footnote => Options::ENABLE_FOOTNOTES,
            Extension::SmartQuotes => Options::ENABLE_SMART_PUNCTUATION,
            Extension::HeadingAttrs => Options::ENABLE_HEADING_ATTRIBUTES,
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Extension {
    type Err = MarkdownError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Extension::ALL
            .into_iter()
            .find(|ext| ext.name() == s)
            .ok_or_else(|| MarkdownError::UnknownExtension(s.to_string()))
    }
}

/// Configures a [`Markdown`].
pub struct MarkdownBuilder<E = ()> {
    preset: Preset,
    toggles: Vec<(Extension, bool)>,
    render_options: RenderOptions,
    strip_indent: bool,
    plugins: Vec<Box<dyn Plugin<E>>>,
}

impl<E: 'static> MarkdownBuilder<E> {
    pub fn new() -> Self {
        Self {
            preset: Preset::default(),
            toggles: Vec::new(),
            render_options: RenderOptions::default(),
            strip_indent: true,
            plugins: Vec::new(),
        }
    }

    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    /// Switches `extension` on, on top of the preset.
    pub fn enable(mut self, extension: Extension) -> Self {
        self.toggles.push((extension, true));
        self
    }

    /// Switches `extension` off, on top of the preset.
    pub fn disable(mut self, extension: Extension) -> Self {
        self.toggles.push((extension, false));
        self
    }

    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    pub fn strip_indent(mut self, strip: bool) -> Self {
        self.strip_indent = strip;
        self
    }

    pub fn plugin(mut self, plugin: impl Plugin<E> + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Applies the plugins in order and assembles the renderer.
    pub fn build(self) -> Result<Markdown<E>, MarkdownError> {
        let mut options = self.preset.options();
        for (extension, on) in &self.toggles {
            log::debug!(
                "{} extension `{extension}`",
                if *on { "enabling" } else { "disabling" }
            );
            options.set(extension.flag(), *on);
        }

        Ok(Markdown {
            options,
            strip_indent: self.strip_indent,
            render_options: self.render_options,
            renderer: build_renderer(&self.plugins)?,
        })
    }
}

impl<E: 'static> Default for MarkdownBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for MarkdownBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<&str> = self
            .plugins
            .iter()
            .map(|plugin| plugin.name().unwrap_or("<unnamed>"))
            .collect();
        f.debug_struct("MarkdownBuilder")
            .field("preset", &self.preset)
            .field("toggles", &self.toggles)
            .field("render_options", &self.render_options)
            .field("strip_indent", &self.strip_indent)
            .field("plugins", &plugins)
            .finish()
    }
}

/// Markdown source in, element tree out.
pub struct Markdown<E = ()> {
    options: Options,
    strip_indent: bool,
    render_options: RenderOptions,
    renderer: Renderer<E>,
}

impl<E: 'static> Markdown<E> {
    pub fn builder() -> MarkdownBuilder<E> {
        MarkdownBuilder::new()
    }

    pub fn renderer(&self) -> &Renderer<E> {
        &self.renderer
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    pub fn parser_options(&self) -> Options {
        self.options
    }

    /// Tokenizes `source`, stripping common indentation first unless disabled.
    pub fn parse(&self, source: &str) -> Vec<Token> {
        if self.strip_indent {
            tokenize(&strip_indent(source), self.options)
        } else {
            tokenize(source, self.options)
        }
    }

    /// Renders `source` to a fragment of top-level nodes.
    pub fn render(&self, source: &str, env: &E) -> Result<Node, MarkdownError> {
        let tokens = self.parse(source);
        Ok(self.renderer.render(&tokens, &self.render_options, env)?)
    }

    pub fn render_nodes(&self, source: &str, env: &E) -> Result<Vec<Node>, MarkdownError> {
        let tokens = self.parse(source);
        Ok(self
            .renderer
            .render_nodes(&tokens, &self.render_options, env)?)
    }

    /// Renders `source` to an HTML string.
    pub fn render_html(&self, source: &str, env: &E) -> Result<String, MarkdownError> {
        let node = self.render(source, env)?;
        Ok(to_html(&node, self.render_options.xhtml_out))
    }
}

impl<E: 'static> Default for Markdown<E> {
    fn default() -> Self {
        Self {
            options: Preset::default().options(),
            strip_indent: true,
            render_options: RenderOptions::default(),
            renderer: Renderer::new(),
        }
    }
}

impl<E> fmt::Debug for Markdown<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markdown")
            .field("options", &self.options)
            .field("strip_indent", &self.strip_indent)
            .field("render_options", &self.render_options)
            .field("renderer", &self.renderer)
            .finish()
    }
}
