//! CLI command implementations.

mod meta;
mod outline;
mod render;

pub(crate) use meta::MetaArgs;
pub(crate) use outline::OutlineArgs;
pub(crate) use render::RenderArgs;

use std::time::Duration;

use mdview_pipeline::{DocumentLoader, DocumentSource, LoadError, LoadedDocument};

/// Load a document named on the command line, as a file path or URL.
fn load_document(input: &str, timeout: Duration) -> Result<LoadedDocument, LoadError> {
    let source = DocumentSource::parse(input);
    DocumentLoader::new().timeout(timeout).load(&source)
}

/// HTTP timeout for commands that don't read the configuration.
const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
