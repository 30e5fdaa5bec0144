use markdown_elements_cmark::{Extension, MarkdownBuilder, MarkdownError, Preset};
use markdown_elements_engine::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remove indentation shared by all lines before parsing.
    pub strip_indent: bool,
    pub render: RenderConfig,
    pub parser: ParserConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strip_indent: true,
            render: RenderConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub breaks: bool,
    pub lang_prefix: String,
    pub xhtml_out: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        Self {
            breaks: defaults.breaks,
            lang_prefix: defaults.lang_prefix,
            xhtml_out: defaults.xhtml_out,
        }
    }
}

impl RenderConfig {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_breaks(self.breaks)
            .with_lang_prefix(self.lang_prefix.clone())
            .with_xhtml_out(self.xhtml_out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub preset: String,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            preset: "default".to_string(),
            enable: Vec::new(),
            disable: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-elements");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expands `~` and environment variables in a user-supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// A [`MarkdownBuilder`] set up from this configuration.
    ///
    /// Fails on an unknown preset or extension name.
    pub fn markdown_builder<E: 'static>(&self) -> Result<MarkdownBuilder<E>, MarkdownError> {
        let mut builder = MarkdownBuilder::new()
            .preset(self.parser.preset.parse::<Preset>()?)
            .render_options(self.render.to_options())
            .strip_indent(self.strip_indent);
        for name in &self.parser.enable {
            builder = builder.enable(name.parse::<Extension>()?);
        }
        for name in &self.parser.disable {
            builder = builder.disable(name.parse::<Extension>()?);
        }
        Ok(builder)
    }
}
