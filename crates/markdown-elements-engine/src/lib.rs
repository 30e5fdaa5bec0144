pub mod attrs;
pub mod error;
pub mod flatten;
pub mod html;
pub mod node;
pub mod options;
pub mod plugin;
pub mod renderer;
pub mod rules;
pub mod token;

// Re-export key types for easier usage
pub use attrs::get_attrs;
pub use error::{PluginError, PluginId, RenderError};
pub use flatten::{append, flatten};
pub use html::{escape_html, to_html, unescape_all};
pub use node::{Element, Key, Node, Props};
pub use options::{Highlighter, RenderOptions};
pub use plugin::{Named, Plugin, PluginHost, build_renderer, named};
pub use renderer::Renderer;
pub use rules::{Rendered, RenderedToken, Rule, RuleTable, defaults::default_rules};
pub use token::{Nesting, Token};
