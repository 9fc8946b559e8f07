//! Mermaid source cleanup before rendering.
//!
//! The renderer is indentation-sensitive and chokes on HTML line breaks inside
//! labels, both of which are common in hand-written documents.

use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// Indentation applied to every line after the diagram declaration.
const BODY_INDENT: &str = "    ";

/// Normalize Mermaid source for the renderer.
///
/// Replaces `<br>` variants with a space, drops leading blank lines, puts the
/// declaration line at column zero and indents every later non-blank line by
/// exactly four spaces. Blank lines inside the body stay empty.
#[must_use]
pub fn normalize_source(source: &str) -> String {
    let source = LINE_BREAK_RE.replace_all(source, " ");
    let mut lines = source
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty());

    let Some(declaration) = lines.next() else {
        return String::new();
    };

    let mut normalized = String::with_capacity(source.len());
    normalized.push_str(declaration);
    for line in lines {
        normalized.push('\n');
        if !line.is_empty() {
            normalized.push_str(BODY_INDENT);
            normalized.push_str(line);
        }
    }
    normalized.truncate(normalized.trim_end().len());
    normalized
}
