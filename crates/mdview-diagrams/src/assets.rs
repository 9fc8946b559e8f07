//! Directory for rasterized diagram images.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Root directory holding one subdirectory per render run.
///
/// The root lives for the whole process and is never cleaned up; images stay
/// on disk so the display can load them after the render returns.
#[derive(Debug)]
pub struct DiagramAssets {
    root: PathBuf,
    runs: AtomicUsize,
}

impl DiagramAssets {
    /// Create a fresh root under the system temp directory.
    pub fn temp() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("mdview-").tempdir()?;
        Ok(Self::with_root(dir.keep()))
    }

    /// Use `root` as the asset root, creating it if needed.
    pub fn at(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self::with_root(root))
    }

    fn with_root(root: PathBuf) -> Self {
        tracing::debug!(root = %root.display(), "Diagram asset directory ready");
        Self {
            root,
            runs: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create and return a new, empty directory for one render run.
    ///
    /// Safe to call from several threads; every call gets a distinct directory.
    pub fn next_run_dir(&self) -> std::io::Result<PathBuf> {
        loop {
            let run = self.runs.fetch_add(1, Ordering::Relaxed);
            let dir = self.root.join(format!("run-{run}"));
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }
        }
    }
}
