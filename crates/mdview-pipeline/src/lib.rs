//! Markdown display pipeline.
//!
//! [`DocumentPipeline`] turns raw markdown into display-ready text in a fixed
//! order: metadata and outline are read from the raw text, metadata tags are
//! stripped, bold-wrapped links are fixed, relative image paths are resolved,
//! and Mermaid blocks are rendered to images. [`DocumentLoader`] reads
//! documents from disk or the web and derives their image base.
//!
//! # Example
//!
//! ```
//! use mdview_markdown::ImageBase;
//! use mdview_pipeline::{DocumentPipeline, PipelineOptions};
//!
//! let pipeline = DocumentPipeline::new();
//! let options = PipelineOptions {
//!     image_base: ImageBase::url("https://example.com/docs"),
//!     ..Default::default()
//! };
//!
//! let doc = pipeline.process(
//!     "# Notes\n<!--category-- Rust -->\n**[Home](index.md)** ![x](img/x.png)",
//!     &options,
//! );
//!
//! assert_eq!(doc.metadata.categories, vec!["Rust"]);
//! assert_eq!(doc.headings[0].text, "Notes");
//! assert!(doc.text.contains("[**Home**](index.md)"));
//! assert!(doc.text.contains("![x](https://example.com/docs/img/x.png)"));
//! assert!(!doc.text.contains("category"));
//! ```

mod document;
mod pipeline;

pub use document::{DocumentLoader, DocumentSource, LoadError, LoadedDocument, url_base, word_count};
pub use pipeline::{DocumentPipeline, PipelineOptions, ProcessedDocument};
