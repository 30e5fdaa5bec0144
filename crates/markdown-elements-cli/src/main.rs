mod args;
mod output;

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use markdown_elements_config::Config;

use crate::args::{Args, Output};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args = Args::parse();

    let config = load_config(&args)?;
    let markdown = config
        .markdown_builder::<()>()
        .context("Invalid parser configuration")?
        .build()?;

    let source = read_input(&args)?;
    let rendered = match args.output() {
        Output::Tree => output::format_tree(&markdown.render_nodes(&source, &())?),
        Output::Html => {
            let mut html = markdown.render_html(&source, &())?;
            html.push('\n');
            html
        }
        Output::Tokens => output::format_tokens(&markdown.parse(&source)),
    };
    print!("{rendered}");

    Ok(())
}

/// Config from `--config`, else the default location, with CLI flags on top.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let path = Config::expand_path(path).unwrap_or_else(|| path.clone());
            Config::load_from_path(&path)?
                .with_context(|| format!("Config file '{}' not found", path.display()))?
        }
        None => match Config::load()? {
            Some(config) => {
                log::debug!("using config from {}", Config::config_path().display());
                config
            }
            None => Config::default(),
        },
    };

    if args.breaks {
        config.render.breaks = true;
    }
    if args.no_strip_indent {
        config.strip_indent = false;
    }
    Ok(config)
}

fn read_input(args: &Args) -> Result<String> {
    match args.input() {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            Ok(source)
        }
    }
}
