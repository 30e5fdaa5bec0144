use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Removes the indentation shared by every non-blank line of `source`.
///
/// Markdown embedded in indented source code (template literals, doc strings)
/// would otherwise parse as an indented code block.
pub fn strip_indent(source: &str) -> Cow<'_, str> {
    static INDENT_RE: OnceLock<Regex> = OnceLock::new();
    let re = INDENT_RE
        .get_or_init(|| Regex::new(r"(?m)^([ \t]*)\S").expect("Invalid indent regex"));

    let indent = re
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|m| m.len()))
        .min()
        .unwrap_or(0);
    if indent == 0 {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let leading = line
            .bytes()
            .take(indent)
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        out.push_str(if leading == indent { &line[indent..] } else { line });
    }
    Cow::Owned(out)
}
