use std::fmt;
use std::sync::Arc;

/// Syntax-highlighting callback: `(code, language) -> highlighted markup`.
///
/// `Ok(None)` means the highlighter had nothing to offer and the escaped code
/// is used instead.
pub type Highlighter = Arc<dyn Fn(&str, &str) -> anyhow::Result<Option<String>> + Send + Sync>;

/// Options forwarded unchanged to every rule.
#[derive(Clone)]
pub struct RenderOptions {
    /// Render soft breaks as `<br>` followed by a newline.
    pub breaks: bool,
    /// Prefix of the CSS class added to fenced code, e.g. `language-rust`.
    pub lang_prefix: String,
    /// Self-close void elements (`<br />`) in legacy HTML output.
    pub xhtml_out: bool,
    pub highlight: Option<Highlighter>,
}

impl RenderOptions {
    pub fn with_breaks(mut self, breaks: bool) -> Self {
        self.breaks = breaks;
        self
    }

    pub fn with_lang_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.lang_prefix = prefix.into();
        self
    }

    pub fn with_xhtml_out(mut self, xhtml_out: bool) -> Self {
        self.xhtml_out = xhtml_out;
        self
    }

    pub fn with_highlighter<F>(mut self, highlight: F) -> Self
    where
        F: Fn(&str, &str) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.highlight = Some(Arc::new(highlight));
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            breaks: false,
            lang_prefix: "language-".to_string(),
            xhtml_out: false,
            highlight: None,
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("breaks", &self.breaks)
            .field("lang_prefix", &self.lang_prefix)
            .field("xhtml_out", &self.xhtml_out)
            .field("highlight", &self.highlight.is_some())
            .finish()
    }
}
