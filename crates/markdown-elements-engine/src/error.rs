use thiserror::Error;

/// Failure of a single render call.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("token index {index} out of range for a stream of {len} tokens")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(
        "rule for `{kind}` at token {index} claimed end index {end}, outside {index}..={len}"
    )]
    EndIndexOutOfRange {
        kind: String,
        index: usize,
        end: usize,
        len: usize,
    },

    #[error("highlighter failed for language `{lang}`: {source}")]
    Highlight {
        lang: String,
        source: anyhow::Error,
    },

    #[error(transparent)]
    Rule(#[from] anyhow::Error),
}

/// Identifies a plugin in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginId {
    Named(String),
    Index(usize),
}

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginId::Named(name) => write!(f, "plugin `{name}`"),
            PluginId::Index(i) => write!(f, "plugin at index {i}"),
        }
    }
}

/// Configuration-time failure while applying plugins.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{plugin} overwrote the renderer")]
    RendererReplaced { plugin: PluginId },

    #[error("{plugin} failed: {source}")]
    Failed {
        plugin: PluginId,
        source: anyhow::Error,
    },
}
