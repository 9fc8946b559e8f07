//! `mdview outline` command implementation.

use clap::Args;
use mdview_markdown::{HeadingItem, extract_headings, flatten_headings};

use super::{DEFAULT_LOAD_TIMEOUT, load_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the outline command.
#[derive(Args)]
pub(crate) struct OutlineArgs {
    /// Markdown file path or http(s) URL.
    input: String,

    /// Print the tree as JSON.
    #[arg(long)]
    json: bool,
}

impl OutlineArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let doc = load_document(&self.input, DEFAULT_LOAD_TIMEOUT)?;
        let headings = extract_headings(&doc.content);

        if self.json {
            output.print(&serde_json::to_string_pretty(&headings)?)?;
        } else if headings.is_empty() {
            output.info("No headings found");
        } else {
            output.print(&format_outline(&headings))?;
        }
        Ok(())
    }
}

/// Render the tree as an indented list, two spaces per level below the top.
fn format_outline(headings: &[HeadingItem]) -> String {
    let flat = flatten_headings(headings);
    let top = flat.iter().map(|h| h.level).min().unwrap_or(1);

    flat.iter()
        .map(|h| {
            let indent = "  ".repeat(usize::from(h.level - top));
            format!("{indent}- {} (#{})", h.text, h.slug)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
