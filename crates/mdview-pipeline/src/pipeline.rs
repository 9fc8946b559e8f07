//! Ordered document transformation.

use std::path::PathBuf;

use mdview_diagrams::{DiagramAssets, DiagramProcessor, RenderContext, Theme};
use mdview_markdown::{
    DocumentMetadata, HeadingItem, ImageBase, extract_headings, extract_metadata, fix_bold_links,
    resolve_image_paths, strip_metadata_tags,
};

/// Per-call rendering choices.
#[derive(Clone, Debug, Default)]
pub struct PipelineOptions {
    /// Base for relative image references.
    pub image_base: ImageBase,
    /// Color scheme diagrams are prepared for.
    pub theme: Theme,
}

/// Result of processing one document.
#[derive(Debug)]
pub struct ProcessedDocument {
    /// Display-ready markdown.
    pub text: String,
    /// Metadata read from the raw text.
    pub metadata: DocumentMetadata,
    /// Heading outline of the raw text.
    pub headings: Vec<HeadingItem>,
    /// Diagram images written for this document.
    pub assets: Vec<PathBuf>,
    /// Diagrams that could not be rendered.
    pub warnings: Vec<String>,
}

/// Diagram processor together with the directory its images go to.
struct DiagramStage {
    processor: DiagramProcessor,
    assets: DiagramAssets,
}

/// Markdown display pipeline.
///
/// Holds no per-document state: each [`process`](Self::process) call gets its
/// own diagram counter and output directory, so one pipeline can serve
/// several documents at once.
#[derive(Default)]
pub struct DocumentPipeline {
    diagrams: Option<DiagramStage>,
}

impl DocumentPipeline {
    /// Pipeline without diagram rendering; Mermaid fences pass through.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable diagram rendering, writing images under `assets`.
    #[must_use]
    pub fn with_diagrams(mut self, processor: DiagramProcessor, assets: DiagramAssets) -> Self {
        self.diagrams = Some(DiagramStage { processor, assets });
        self
    }

    /// Whether Mermaid blocks are rendered.
    #[must_use]
    pub fn renders_diagrams(&self) -> bool {
        self.diagrams.is_some()
    }

    /// Run the full pipeline on raw document text.
    ///
    /// Never fails. Metadata and headings come from the raw text; the display
    /// text has metadata tags removed, links fixed, image paths resolved and
    /// diagrams rendered, in that order, and is trimmed.
    pub fn process(&self, raw: &str, options: &PipelineOptions) -> ProcessedDocument {
        let metadata = extract_metadata(raw);
        let headings = extract_headings(raw);

        let text = strip_metadata_tags(raw);
        let text = fix_bold_links(&text);
        let text = resolve_image_paths(&text, &options.image_base);

        let (text, assets, warnings) = match &self.diagrams {
            Some(stage) => render_diagrams(stage, &text, options.theme),
            None => (text, Vec::new(), Vec::new()),
        };

        tracing::debug!(
            categories = metadata.categories.len(),
            headings = headings.len(),
            diagrams = assets.len(),
            failed = warnings.len(),
            "Processed document"
        );

        ProcessedDocument {
            text: text.trim().to_owned(),
            metadata,
            headings,
            assets,
            warnings,
        }
    }

    /// Run the pipeline and return only the display text.
    pub fn process_text(&self, raw: &str, options: &PipelineOptions) -> String {
        self.process(raw, options).text
    }
}

fn render_diagrams(
    stage: &DiagramStage,
    text: &str,
    theme: Theme,
) -> (String, Vec<PathBuf>, Vec<String>) {
    let output_dir = match stage.assets.next_run_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(
                error = %e,
                root = %stage.assets.root().display(),
                "Cannot create diagram directory"
            );
            let warning = format!("diagrams not rendered: cannot create output directory: {e}");
            return (text.to_owned(), Vec::new(), vec![warning]);
        }
    };

    let mut ctx = RenderContext::new(output_dir, theme);
    let text = stage.processor.render_diagrams(text, &mut ctx);
    let (assets, warnings) = ctx.into_parts();
    (text, assets, warnings)
}
