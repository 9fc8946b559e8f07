//! Per-render state.

use std::path::{Path, PathBuf};

use crate::consts::{DARK_TEXT_COLOR, LIGHT_TEXT_COLOR};

/// Host color scheme diagrams are prepared for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Label text color that stays readable on this scheme's background.
    #[must_use]
    pub fn text_color(self) -> &'static str {
        match self {
            Self::Light => LIGHT_TEXT_COLOR,
            Self::Dark => DARK_TEXT_COLOR,
        }
    }

    /// Parse `light` or `dark`, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// State for one full-document diagram render.
///
/// A context is created per document and never shared, so the diagram
/// counter starts at zero for every render and concurrent renders cannot
/// collide on file names as long as they use different output directories.
#[derive(Debug)]
pub struct RenderContext {
    output_dir: PathBuf,
    theme: Theme,
    counter: usize,
    assets: Vec<PathBuf>,
    warnings: Vec<String>,
}

impl RenderContext {
    /// Create a context writing images into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, theme: Theme) -> Self {
        Self {
            output_dir: output_dir.into(),
            theme,
            counter: 0,
            assets: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Number of image files handed out so far.
    #[must_use]
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Images written during this render, in document order.
    #[must_use]
    pub fn assets(&self) -> &[PathBuf] {
        &self.assets
    }

    /// Diagnostics for diagrams that failed to render.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the context, returning produced assets and warnings.
    #[must_use]
    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<String>) {
        (self.assets, self.warnings)
    }

    /// Path the next image will be written to. The counter is unchanged
    /// until the image is recorded.
    pub(crate) fn next_asset_path(&self) -> PathBuf {
        self.output_dir.join(format!("diagram-{}.png", self.counter))
    }

    /// Record a written image and advance the counter.
    pub(crate) fn record_asset(&mut self, path: PathBuf) {
        self.assets.push(path);
        self.counter += 1;
    }

    pub(crate) fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths_are_sequential() {
        let mut ctx = RenderContext::new("/tmp/run", Theme::Dark);

        assert_eq!(ctx.counter(), 0);
        assert_eq!(ctx.next_asset_path(), PathBuf::from("/tmp/run/diagram-0.png"));
        assert_eq!(ctx.next_asset_path(), PathBuf::from("/tmp/run/diagram-0.png"));

        ctx.record_asset(ctx.next_asset_path());
        assert_eq!(ctx.next_asset_path(), PathBuf::from("/tmp/run/diagram-1.png"));
        ctx.record_asset(ctx.next_asset_path());
        assert_eq!(ctx.counter(), 2);
        assert_eq!(ctx.assets().len(), 2);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!(Theme::parse("Dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn test_theme_text_colors_differ() {
        assert_ne!(Theme::Light.text_color(), Theme::Dark.text_color());
    }
}
