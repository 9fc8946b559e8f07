//! SVG to PNG rasterization.

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};

use crate::error::DiagramError;

/// Turns an SVG document into encoded PNG bytes.
pub trait Rasterizer: Send + Sync {
    /// Render `svg` at `scale` times its intrinsic size onto a transparent canvas.
    fn rasterize(&self, svg: &str, scale: f32) -> Result<Vec<u8>, DiagramError>;
}

/// [`Rasterizer`] built on resvg with the system font collection.
pub struct ResvgRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl ResvgRasterizer {
    /// Create a rasterizer, loading system fonts once.
    #[must_use]
    pub fn new() -> Self {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_system_fonts();
        tracing::debug!(faces = fontdb.len(), "Loaded system fonts");
        Self {
            fontdb: Arc::new(fontdb),
        }
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, scale: f32) -> Result<Vec<u8>, DiagramError> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree =
            usvg::Tree::from_str(svg, &options).map_err(|e| DiagramError::Raster(e.to_string()))?;

        let size = tree
            .size()
            .to_int_size()
            .scale_by(scale)
            .ok_or_else(|| DiagramError::Raster(format!("cannot scale image by {scale}")))?;
        let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            DiagramError::Raster(format!(
                "cannot allocate {}x{} canvas",
                size.width(),
                size.height()
            ))
        })?;

        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| DiagramError::Raster(e.to_string()))
    }
}

/// Run `rasterizer` on a worker thread, giving up after `timeout`.
///
/// A timed-out worker is left to finish on its own; its result is discarded.
pub fn rasterize_with_deadline(
    rasterizer: &Arc<dyn Rasterizer>,
    svg: String,
    scale: f32,
    timeout: Duration,
) -> Result<Vec<u8>, DiagramError> {
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(rasterizer);
    thread::Builder::new()
        .name("mdview-rasterize".to_owned())
        .spawn(move || {
            let _ = tx.send(worker.rasterize(&svg, scale));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(DiagramError::Timeout {
            stage: "rasterization",
            timeout,
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(DiagramError::Raster(
            "rasterizer stopped without a result".to_owned(),
        )),
    }
}
