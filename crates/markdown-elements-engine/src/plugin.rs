//! # Plugins
//!
//! Plugins extend a renderer by registering rules on a [`PluginHost`]. The
//! rules they register become the inherited table that the default rules are
//! merged over when the renderer is built.
//!
//! A plugin may also try to swap the whole renderer out with
//! [`PluginHost::set_renderer`]. That would leave the host with a rule table
//! nobody can reason about, so it is detected after each plugin and reported as
//! [`PluginError::RendererReplaced`].

use crate::error::{PluginError, PluginId, RenderError};
use crate::options::RenderOptions;
use crate::renderer::Renderer;
use crate::rules::{Rendered, RuleTable};
use crate::token::Token;

/// Something that configures a renderer.
pub trait Plugin<E> {
    /// Name used in error messages; unnamed plugins are reported by position.
    fn name(&self) -> Option<&str> {
        None
    }

    fn apply(&self, host: &mut PluginHost<E>) -> anyhow::Result<()>;
}

impl<E, F> Plugin<E> for F
where
    F: Fn(&mut PluginHost<E>) -> anyhow::Result<()>,
{
    fn apply(&self, host: &mut PluginHost<E>) -> anyhow::Result<()> {
        self(host)
    }
}

/// A closure plugin with a name.
pub struct Named<F> {
    name: String,
    plugin: F,
}

/// Gives `plugin` a name for error reporting.
pub fn named<F>(name: impl Into<String>, plugin: F) -> Named<F> {
    Named {
        name: name.into(),
        plugin,
    }
}

impl<E, F> Plugin<E> for Named<F>
where
    F: Fn(&mut PluginHost<E>) -> anyhow::Result<()>,
{
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn apply(&self, host: &mut PluginHost<E>) -> anyhow::Result<()> {
        (self.plugin)(host)
    }
}

/// What plugins get to see while the renderer is being assembled.
pub struct PluginHost<E> {
    rules: RuleTable<E>,
    replaced: bool,
}

impl<E: 'static> PluginHost<E> {
    pub fn new() -> Self {
        Self::with_rules(RuleTable::new())
    }

    /// Starts from rules inherited from elsewhere, e.g. another renderer.
    pub fn with_rules(rules: RuleTable<E>) -> Self {
        Self {
            rules,
            replaced: false,
        }
    }

    pub fn add_rule<F>(&mut self, kind: impl Into<String>, rule: F)
    where
        F: Fn(&[Token], usize, &RenderOptions, &E, &Renderer<E>) -> Result<Rendered, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.rules.insert(kind, rule);
    }

    pub fn rules(&self) -> &RuleTable<E> {
        &self.rules
    }

    /// Replaces the renderer wholesale. Always rejected by [`PluginHost::apply`].
    pub fn set_renderer(&mut self, renderer: Renderer<E>) {
        self.rules = renderer.rules().clone();
        self.replaced = true;
    }

    /// Runs `plugin`, which sits at `index` in the caller's plugin list.
    pub fn apply(&mut self, index: usize, plugin: &dyn Plugin<E>) -> Result<(), PluginError> {
        let id = match plugin.name() {
            Some(name) => PluginId::Named(name.to_string()),
            None => PluginId::Index(index),
        };
        log::debug!("applying {id}");

        plugin
            .apply(self)
            .map_err(|source| PluginError::Failed {
                plugin: id.clone(),
                source,
            })?;

        if self.replaced {
            return Err(PluginError::RendererReplaced { plugin: id });
        }
        Ok(())
    }

    /// Builds the renderer: registered rules overlaid with the defaults.
    pub fn build(self) -> Renderer<E> {
        Renderer::with_inherited(self.rules)
    }
}

impl<E: 'static> Default for PluginHost<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `plugins` in order and builds the resulting renderer.
pub fn build_renderer<E: 'static>(
    plugins: &[Box<dyn Plugin<E>>],
) -> Result<Renderer<E>, PluginError> {
    let mut host = PluginHost::new();
    for (index, plugin) in plugins.iter().enumerate() {
        host.apply(index, plugin.as_ref())?;
    }
    Ok(host.build())
}
