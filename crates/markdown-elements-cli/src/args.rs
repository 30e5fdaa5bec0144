use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Output {
    /// The element tree
    #[default]
    Tree,
    /// Legacy HTML
    Html,
    /// The token stream
    Tokens,
}

/// Renders markdown from FILE (or stdin when FILE is `-` or missing).
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "markdown-elements", version)]
#[command(group(ArgGroup::new("format").args(["output", "tree", "html", "tokens"])))]
pub struct Args {
    /// What to print
    #[arg(short, long, value_enum, value_name = "FORMAT", default_value_t = Output::Tree)]
    output: Output,

    /// Print the element tree (default)
    #[arg(long)]
    tree: bool,

    /// Print legacy HTML
    #[arg(long)]
    html: bool,

    /// Print the token stream
    #[arg(long)]
    tokens: bool,

    /// Render soft breaks as <br>
    #[arg(long)]
    pub breaks: bool,

    /// Keep common leading indentation
    #[arg(long)]
    pub no_strip_indent: bool,

    /// Read configuration from PATH
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

impl Args {
    /// The selected output, with the shorthand flags taking effect.
    pub fn output(&self) -> Output {
        if self.html {
            Output::Html
        } else if self.tokens {
            Output::Tokens
        } else if self.tree {
            Output::Tree
        } else {
            self.output
        }
    }

    /// The file to read; `None` reads stdin.
    pub fn input(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|path| *path != Path::new("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("markdown-elements").chain(list.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_to_tree_on_stdin() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.output(), Output::Tree);
        assert_eq!(args.input(), None);
        assert!(!args.breaks);
        assert!(!args.no_strip_indent);
        assert_eq!(args.config, None);
    }

    #[test]
    fn reads_flags_and_file() {
        let args = parse(&["--html", "--breaks", "--config", "~/x.toml", "notes.md"]).unwrap();

        assert_eq!(args.output(), Output::Html);
        assert!(args.breaks);
        assert!(!args.no_strip_indent);
        assert_eq!(args.config, Some(PathBuf::from("~/x.toml")));
        assert_eq!(args.input(), Some(Path::new("notes.md")));
    }

    #[rstest]
    #[case(&["--tree"], Output::Tree)]
    #[case(&["--html"], Output::Html)]
    #[case(&["--tokens"], Output::Tokens)]
    #[case(&["--output", "html"], Output::Html)]
    #[case(&["-o", "tokens"], Output::Tokens)]
    fn selects_output(#[case] list: &[&str], #[case] expected: Output) {
        assert_eq!(parse(list).unwrap().output(), expected);
    }

    #[test]
    fn dash_reads_stdin() {
        let args = parse(&["--no-strip-indent", "-"]).unwrap();
        assert!(args.no_strip_indent);
        assert_eq!(args.input(), None);
    }

    #[rstest]
    #[case(&["--config"], ErrorKind::InvalidValue)]
    #[case(&["--json"], ErrorKind::UnknownArgument)]
    #[case(&["--output", "json"], ErrorKind::InvalidValue)]
    #[case(&["a.md", "b.md"], ErrorKind::UnknownArgument)]
    #[case(&["--html", "--tokens"], ErrorKind::ArgumentConflict)]
    #[case(&["--output", "tree", "--html"], ErrorKind::ArgumentConflict)]
    fn rejects_bad_arguments(#[case] list: &[&str], #[case] kind: ErrorKind) {
        assert_eq!(parse(list).unwrap_err().kind(), kind);
    }
}
