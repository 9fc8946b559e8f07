//! Text-level markdown transforms for on-screen display.
//!
//! Everything in this crate works on raw markdown text with regular expressions
//! rather than on a syntax tree, so substitutions behave exactly as written,
//! including their ordering edge cases.
//!
//! # Modules
//!
//! - [`metadata`]: `<!--category-- ... -->` and `<datetime>` tag extraction
//! - [`links`]: bold-wrapped link normalization
//! - [`images`]: relative image path resolution against a base directory or URL
//! - [`headings`]: ATX heading outline with slugs
//!
//! # Example
//!
//! ```
//! use mdview_markdown::{ImageBase, extract_headings, extract_metadata, fix_bold_links, resolve_image_paths};
//!
//! let text = "# Guide\n<!--category-- Rust, Docs -->\n**[Home](index.md)** ![logo](img/logo.png)";
//!
//! let metadata = extract_metadata(text);
//! assert_eq!(metadata.categories, vec!["Rust", "Docs"]);
//!
//! let headings = extract_headings(text);
//! assert_eq!(headings[0].slug, "guide");
//!
//! let fixed = fix_bold_links(text);
//! assert!(fixed.contains("[**Home**](index.md)"));
//!
//! let base = ImageBase::url("https://example.com/docs/");
//! let resolved = resolve_image_paths(&fixed, &base);
//! assert!(resolved.contains("![logo](https://example.com/docs/img/logo.png)"));
//! ```

pub mod headings;
pub mod images;
pub mod links;
pub mod metadata;

pub use headings::{HeadingItem, extract_headings, flatten_headings, slugify};
pub use images::{ImageBase, resolve_image_paths};
pub use links::fix_bold_links;
pub use metadata::{DocumentMetadata, extract_metadata, strip_metadata_tags};
