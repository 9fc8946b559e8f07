//! Mermaid fence discovery and substitution.
//!
//! [`DiagramProcessor`] finds every ```` ```mermaid ```` block in a document and
//! replaces it with a markdown image reference to a rasterized PNG. A block
//! that fails at any stage is replaced by a quoted diagnostic followed by its
//! original source, fenced with four backticks so later passes leave it alone.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::{Captures, Regex};

use crate::consts::{DEFAULT_RASTER_TIMEOUT, DEFAULT_SCALE};
use crate::context::RenderContext;
use crate::error::DiagramError;
use crate::kind::DiagramKind;
use crate::kroki::{DiagramRenderer, KrokiRenderer};
use crate::normalize::normalize_source;
use crate::rasterize::{Rasterizer, ResvgRasterizer, rasterize_with_deadline};
use crate::svg::prepare_svg;

/// A line-anchored three-backtick `mermaid` fence, its body, and the closing fence line.
static MERMAID_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^[ \t]*```mermaid[ \t]*\r?\n(.*?)^[ \t]*```[ \t]*\r?$").unwrap()
});

const UNSUPPORTED_NOTE: &str =
    "Line breaks inside labels and nested subgraphs are not supported by the renderer.";

/// Renders Mermaid blocks to images through pluggable collaborators.
///
/// The processor holds no per-document state and can be shared between
/// threads; everything that changes during a render lives in the
/// [`RenderContext`] passed to [`render_diagrams`](Self::render_diagrams).
///
/// # Example
///
/// ```no_run
/// use mdview_diagrams::{DiagramAssets, DiagramProcessor, RenderContext, Theme};
///
/// let processor = DiagramProcessor::kroki("https://kroki.io");
/// let assets = DiagramAssets::temp()?;
/// let mut ctx = RenderContext::new(assets.next_run_dir()?, Theme::Dark);
///
/// let text = processor.render_diagrams("```mermaid\ngraph TD\n  A --> B\n```\n", &mut ctx);
/// assert!(text.contains("![graph diagram]("));
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct DiagramProcessor {
    renderer: Arc<dyn DiagramRenderer>,
    rasterizer: Arc<dyn Rasterizer>,
    scale: f32,
    raster_timeout: Duration,
}

impl DiagramProcessor {
    /// Create a processor from a renderer and a rasterizer.
    #[must_use]
    pub fn new(
        renderer: impl DiagramRenderer + 'static,
        rasterizer: impl Rasterizer + 'static,
    ) -> Self {
        Self {
            renderer: Arc::new(renderer),
            rasterizer: Arc::new(rasterizer),
            scale: DEFAULT_SCALE,
            raster_timeout: DEFAULT_RASTER_TIMEOUT,
        }
    }

    /// Kroki rendering with resvg rasterization.
    #[must_use]
    pub fn kroki(kroki_url: impl Into<String>) -> Self {
        Self::new(KrokiRenderer::new(kroki_url), ResvgRasterizer::new())
    }

    /// Set the supersampling multiplier (default: 2.0).
    #[must_use]
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the deadline for rasterizing one diagram (default: 30 seconds).
    #[must_use]
    pub fn raster_timeout(mut self, timeout: Duration) -> Self {
        self.raster_timeout = timeout;
        self
    }

    /// Replace every Mermaid block in `text`, in document order.
    ///
    /// Never fails as a whole: each block either becomes an image reference
    /// or an inline diagnostic, and failures are also recorded in `ctx`.
    pub fn render_diagrams(&self, text: &str, ctx: &mut RenderContext) -> String {
        MERMAID_FENCE_RE
            .replace_all(text, |caps: &Captures| self.render_block(&caps[1], ctx))
            .into_owned()
    }

    fn render_block(&self, source: &str, ctx: &mut RenderContext) -> String {
        let kind = DiagramKind::detect(source);
        match self.render_to_file(source, ctx) {
            Ok(path) => {
                tracing::debug!(%kind, path = %path.display(), "Rendered diagram");
                let reference = image_reference(&kind, &path);
                ctx.record_asset(path);
                reference
            }
            Err(err) => {
                tracing::warn!(%kind, error = %err, "Diagram rendering failed");
                ctx.warn(format!("{kind} diagram: {err}"));
                diagnostic_block(&kind, &err, source)
            }
        }
    }

    fn render_to_file(
        &self,
        source: &str,
        ctx: &mut RenderContext,
    ) -> Result<PathBuf, DiagramError> {
        let normalized = normalize_source(source);
        let svg = self.renderer.render_svg(&normalized)?;
        let svg = prepare_svg(&svg, ctx.theme())?;
        let png = rasterize_with_deadline(&self.rasterizer, svg, self.scale, self.raster_timeout)?;

        let path = ctx.next_asset_path();
        std::fs::write(&path, png)?;
        Ok(path)
    }
}

fn image_reference(kind: &DiagramKind, path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        format!("\n\n![{kind} diagram](<{path}>)\n\n")
    } else {
        format!("\n\n![{kind} diagram]({path})\n\n")
    }
}

fn diagnostic_block(kind: &DiagramKind, err: &DiagramError, source: &str) -> String {
    let title = if err.is_parse_error() {
        "Diagram parse error"
    } else {
        "Cannot render diagram"
    };

    let mut block = format!("\n\n> **{title}** ({kind} diagram)\n>\n");
    for line in err.to_string().lines() {
        if line.trim().is_empty() {
            block.push_str(">\n");
        } else {
            block.push_str("> ");
            block.push_str(line);
            block.push('\n');
        }
    }
    block.push_str(">\n> _");
    block.push_str(UNSUPPORTED_NOTE);
    block.push_str("_\n\n````mermaid\n");
    block.push_str(source);
    if !source.is_empty() && !source.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("````\n\n");
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DARK_TEXT_COLOR;
    use crate::context::Theme;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const STUB_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><foreignObject width="10" height="10"><p>Node</p></foreignObject></svg>"#;
    const STUB_PNG: &[u8] = b"\x89PNG stub";

    /// Records every source it is asked to render.
    #[derive(Clone, Default)]
    struct StubRenderer {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl DiagramRenderer for StubRenderer {
        fn render_svg(&self, source: &str) -> Result<String, DiagramError> {
            self.calls.lock().unwrap().push(source.to_owned());
            if source.contains("BROKEN") {
                return Err(DiagramError::Status {
                    status: 400,
                    body: "Parse error on line 2:\nExpecting 'SEMI', got 'EOF'".to_owned(),
                });
            }
            if source.contains("OFFLINE") {
                return Err(DiagramError::Http("connection refused".to_owned()));
            }
            Ok(STUB_SVG.to_owned())
        }
    }

    /// Records the SVG it receives and returns fixed bytes.
    #[derive(Clone, Default)]
    struct StubRasterizer {
        svgs: Arc<Mutex<Vec<String>>>,
    }

    impl Rasterizer for StubRasterizer {
        fn rasterize(&self, svg: &str, _scale: f32) -> Result<Vec<u8>, DiagramError> {
            self.svgs.lock().unwrap().push(svg.to_owned());
            Ok(STUB_PNG.to_vec())
        }
    }

    fn setup() -> (DiagramProcessor, StubRenderer, StubRasterizer, TempDir) {
        let renderer = StubRenderer::default();
        let rasterizer = StubRasterizer::default();
        let processor = DiagramProcessor::new(renderer.clone(), rasterizer.clone());
        (processor, renderer, rasterizer, TempDir::new().unwrap())
    }

    #[test]
    fn test_blocks_replaced_with_image_references() {
        let (processor, _, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);
        let text = "Intro\n\n```mermaid\ngraph TD\n  A --> B\n```\n\nMiddle\n\n```mermaid\nsequenceDiagram\n  A->>B: hi\n```\nEnd";

        let out = processor.render_diagrams(text, &mut ctx);

        let first = temp.path().join("diagram-0.png");
        let second = temp.path().join("diagram-1.png");
        assert!(!out.contains("```mermaid"));
        assert_eq!(out.matches("![").count(), 2);
        assert!(out.contains(&format!(
            "![graph diagram]({})",
            first.to_string_lossy().replace('\\', "/")
        )));
        assert!(out.contains("![sequence diagram]("));
        assert_eq!(std::fs::read(&first).unwrap(), STUB_PNG);
        assert!(second.is_file());
        assert_eq!(ctx.assets(), &[first, second]);
        assert_eq!(ctx.counter(), 2);
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_image_reference_is_block_separated() {
        let (processor, _, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);

        let out = processor.render_diagrams("Before\n```mermaid\npie\n```\nAfter", &mut ctx);

        assert!(out.starts_with("Before\n\n\n![pie diagram]("));
        assert!(out.ends_with(".png)\n\n\nAfter"));
    }

    #[test]
    fn test_renderer_receives_normalized_source() {
        let (processor, renderer, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);

        processor.render_diagrams(
            "```mermaid\n\n   flowchart LR\nA[One<br/>Two] --> B\n```",
            &mut ctx,
        );

        assert_eq!(
            *renderer.calls.lock().unwrap(),
            vec!["flowchart LR\n    A[One Two] --> B".to_owned()]
        );
    }

    #[test]
    fn test_svg_prepared_for_theme() {
        let (processor, _, rasterizer, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Dark);

        processor.render_diagrams("```mermaid\ngraph TD\n  A\n```", &mut ctx);

        let svgs = rasterizer.svgs.lock().unwrap();
        assert!(!svgs[0].contains("foreignObject"));
        assert!(svgs[0].contains(">Node</text>"));
        assert!(svgs[0].contains(DARK_TEXT_COLOR));
    }

    #[test]
    fn test_parse_failure_keeps_source() {
        let (processor, _, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);
        let source = "graph TD\n  A --> BROKEN\n";
        let text = format!("```mermaid\n{source}```");

        let out = processor.render_diagrams(&text, &mut ctx);

        assert!(out.contains("> **Diagram parse error** (graph diagram)"));
        assert!(out.contains("> HTTP 400: Parse error on line 2:\n> Expecting 'SEMI', got 'EOF'\n"));
        assert!(out.contains(UNSUPPORTED_NOTE));
        assert!(out.contains(&format!("````mermaid\n{source}````")));
        assert!(!out.contains("!["));
        assert_eq!(ctx.counter(), 0);
        assert!(ctx.assets().is_empty());
        assert_eq!(ctx.warnings().len(), 1);
        assert!(ctx.warnings()[0].starts_with("graph diagram: HTTP 400"));
    }

    #[test]
    fn test_render_failure_title() {
        let (processor, _, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);

        let out = processor.render_diagrams("```mermaid\npie OFFLINE\n```", &mut ctx);

        assert!(out.contains("> **Cannot render diagram** (pie diagram)"));
        assert!(out.contains("> HTTP error: connection refused"));
    }

    #[test]
    fn test_failure_does_not_consume_counter() {
        let (processor, _, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);
        let text = "```mermaid\ngraph BROKEN\n```\n\n```mermaid\ngraph TD\n  A\n```";

        let out = processor.render_diagrams(text, &mut ctx);

        assert!(out.contains("diagram-0.png"));
        assert!(!out.contains("diagram-1.png"));
        assert_eq!(ctx.assets().len(), 1);
        assert_eq!(ctx.warnings().len(), 1);
    }

    #[test]
    fn test_second_pass_discovers_nothing() {
        let (processor, renderer, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);
        let text = "```mermaid\ngraph TD\n  A\n```\n\n```mermaid\ngraph BROKEN\n```";

        let once = processor.render_diagrams(text, &mut ctx);
        let twice = processor.render_diagrams(&once, &mut ctx);

        assert_eq!(twice, once);
        assert_eq!(renderer.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_other_fences_untouched() {
        let (processor, renderer, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);
        let text = "```rust\nfn main() {}\n```\n\n````mermaid\ngraph TD\n````\n\n```mermaidjs\ngraph TD\n```";

        let out = processor.render_diagrams(text, &mut ctx);

        assert_eq!(out, text);
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_indented_fence() {
        let (processor, _, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);

        let out = processor.render_diagrams("  ```mermaid\n  graph TD\n    A\n  ```\n", &mut ctx);

        assert!(out.contains("![graph diagram]("));
        assert!(!out.contains("```"));
    }

    #[test]
    fn test_empty_block_reported_as_unknown() {
        let renderer = StubRenderer::default();
        let processor = DiagramProcessor::new(renderer.clone(), StubRasterizer::default());
        let temp = TempDir::new().unwrap();
        let mut ctx = RenderContext::new(temp.path(), Theme::Light);

        let out = processor.render_diagrams("```mermaid\n```", &mut ctx);

        assert!(out.contains("![unknown diagram]("));
        assert_eq!(*renderer.calls.lock().unwrap(), vec![String::new()]);
    }

    #[test]
    fn test_missing_output_dir_is_io_failure() {
        let (processor, _, _, temp) = setup();
        let mut ctx = RenderContext::new(temp.path().join("missing"), Theme::Light);

        let out = processor.render_diagrams("```mermaid\ngraph TD\n```", &mut ctx);

        assert!(out.contains("> **Cannot render diagram** (graph diagram)"));
        assert!(out.contains("> I/O error:"));
        assert_eq!(ctx.counter(), 0);
        assert!(ctx.assets().is_empty());
    }

    #[test]
    fn test_output_dir_with_space_uses_angle_brackets() {
        let (processor, _, _, temp) = setup();
        let dir = temp.path().join("My Docs");
        std::fs::create_dir(&dir).unwrap();
        let mut ctx = RenderContext::new(&dir, Theme::Light);

        let out = processor.render_diagrams("```mermaid\ngraph TD\n```", &mut ctx);

        let expected = format!(
            "\n\n![graph diagram](<{}>)\n\n",
            dir.join("diagram-0.png").to_string_lossy().replace('\\', "/")
        );
        assert_eq!(out, expected);
        assert!(dir.join("diagram-0.png").is_file());
    }

    #[test]
    fn test_plain_path_not_wrapped() {
        let reference = image_reference(
            &DiagramKind::detect("pie"),
            Path::new("/tmp/run-0/diagram-3.png"),
        );
        assert_eq!(reference, "\n\n![pie diagram](/tmp/run-0/diagram-3.png)\n\n");
    }
}
