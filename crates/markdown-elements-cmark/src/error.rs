use markdown_elements_engine::{PluginError, RenderError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("unknown extension `{0}`")]
    UnknownExtension(String),

    #[error("unknown preset `{0}`, expected `default` or `commonmark`")]
    UnknownPreset(String),
}
