//! `mdview render` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use mdview_config::{CliSettings, Config, ImagesConfig, ThemeName};
use mdview_diagrams::{DiagramAssets, DiagramProcessor, KrokiRenderer, ResvgRasterizer, Theme};
use mdview_markdown::ImageBase;
use mdview_pipeline::{DocumentPipeline, PipelineOptions};

use super::load_document;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file path or http(s) URL.
    input: String,

    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prepare diagrams for a dark background.
    #[arg(long, conflicts_with = "light")]
    dark: bool,

    /// Prepare diagrams for a light background.
    #[arg(long)]
    light: bool,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "MDVIEW_KROKI_URL")]
    kroki_url: Option<String>,

    /// Leave Mermaid blocks as code.
    #[arg(long)]
    no_diagrams: bool,

    /// Directory for rendered diagram images (default: a new temp directory).
    #[arg(long)]
    asset_dir: Option<PathBuf>,

    /// Resolve relative image paths against this directory.
    #[arg(long, conflicts_with = "base_url")]
    base_path: Option<PathBuf>,

    /// Resolve relative image paths against this URL.
    #[arg(long)]
    base_url: Option<String>,
}

impl RenderArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Using configuration file");
        }

        let doc = load_document(
            &self.input,
            Duration::from_secs(config.diagrams.timeout_secs),
        )?;
        let options = PipelineOptions {
            image_base: image_base(&config.images_resolved, doc.image_base),
            theme: theme(config.render_resolved.theme),
        };

        let pipeline = build_pipeline(&config)?;
        let processed = pipeline.process(&doc.content, &options);

        output.print(&processed.text)?;
        for warning in &processed.warnings {
            output.warning(&format!("Warning: {warning}"));
        }
        if let Some(first) = processed.assets.first().and_then(|p| p.parent()) {
            output.info(&format!(
                "{} diagram(s) written to {}",
                processed.assets.len(),
                first.display()
            ));
        }
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        let theme = if self.dark {
            Some(ThemeName::Dark)
        } else if self.light {
            Some(ThemeName::Light)
        } else {
            None
        };

        CliSettings {
            kroki_url: self.kroki_url.clone(),
            diagrams_enabled: self.no_diagrams.then_some(false),
            theme,
            asset_dir: self.asset_dir.clone(),
            base_path: self.base_path.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

fn build_pipeline(config: &Config) -> Result<DocumentPipeline, CliError> {
    let diagrams = &config.diagrams;
    if !diagrams.enabled {
        return Ok(DocumentPipeline::new());
    }

    let renderer = KrokiRenderer::new(diagrams.kroki_url.as_str())
        .timeout(Duration::from_secs(diagrams.timeout_secs));
    let processor = DiagramProcessor::new(renderer, ResvgRasterizer::new())
        .scale(diagrams.scale)
        .raster_timeout(Duration::from_secs(diagrams.raster_timeout_secs));
    let assets = match &config.render_resolved.asset_dir {
        Some(dir) => DiagramAssets::at(dir)?,
        None => DiagramAssets::temp()?,
    };

    Ok(DocumentPipeline::new().with_diagrams(processor, assets))
}

/// Configured image base, falling back to the one derived from the document's location.
fn image_base(images: &ImagesConfig, loaded: ImageBase) -> ImageBase {
    if let Some(path) = &images.base_path {
        return ImageBase::path(path.as_path());
    }
    if let Some(url) = &images.base_url {
        return ImageBase::url(url.as_str());
    }
    loaded
}

fn theme(name: ThemeName) -> Theme {
    match name {
        ThemeName::Light => Theme::Light,
        ThemeName::Dark => Theme::Dark,
    }
}
