//! `mdview meta` command implementation.

use clap::Args;
use mdview_markdown::{DocumentMetadata, extract_metadata};
use serde::Serialize;

use super::{DEFAULT_LOAD_TIMEOUT, load_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the meta command.
#[derive(Args)]
pub(crate) struct MetaArgs {
    /// Markdown file path or http(s) URL.
    input: String,

    /// Print the metadata as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct MetaReport {
    #[serde(flatten)]
    metadata: DocumentMetadata,
    word_count: usize,
}

impl MetaArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let doc = load_document(&self.input, DEFAULT_LOAD_TIMEOUT)?;
        let report = MetaReport {
            metadata: extract_metadata(&doc.content),
            word_count: doc.word_count,
        };

        if self.json {
            output.print(&serde_json::to_string_pretty(&report)?)?;
        } else {
            output.print(&format_report(&report))?;
        }
        Ok(())
    }
}

fn format_report(report: &MetaReport) -> String {
    let categories = if report.metadata.categories.is_empty() {
        "-".to_owned()
    } else {
        report.metadata.categories.join(", ")
    };
    let published = report
        .metadata
        .publication_date
        .map_or_else(|| "-".to_owned(), |date| date.format("%Y-%m-%d %H:%M").to_string());

    format!(
        "Categories: {categories}\nPublished:  {published}\nWords:      {}",
        report.word_count
    )
}
