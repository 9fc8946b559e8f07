//! Reading documents from disk or the web.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mdview_markdown::ImageBase;
use ureq::Agent;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error loading a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Where a document comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Url(String),
}

impl DocumentSource {
    /// Classify a command-line input: `http://` and `https://` (any case) are
    /// URLs, anything else is a file path.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(input.to_owned())
        } else {
            Self::File(PathBuf::from(input))
        }
    }
}

/// Raw document text together with the base its images resolve against.
#[derive(Debug)]
pub struct LoadedDocument {
    pub source: DocumentSource,
    pub content: String,
    pub image_base: ImageBase,
    pub word_count: usize,
}

/// Loads documents from files or HTTP(S) URLs.
pub struct DocumentLoader {
    agent: Agent,
}

impl DocumentLoader {
    /// Create a loader with the default 30 second HTTP timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set the HTTP timeout for each request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Read the document behind `source`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read, the request fails or
    /// answers with an error status, or the URL has no host.
    pub fn load(&self, source: &DocumentSource) -> Result<LoadedDocument, LoadError> {
        let (content, image_base) = match source {
            DocumentSource::File(path) => load_file(path)?,
            DocumentSource::Url(url) => self.load_url(url)?,
        };

        let word_count = word_count(&content);
        tracing::info!(?source, bytes = content.len(), word_count, "Loaded document");

        Ok(LoadedDocument {
            source: source.clone(),
            content,
            image_base,
            word_count,
        })
    }

    fn load_url(&self, url: &str) -> Result<(String, ImageBase), LoadError> {
        let base = url_base(url)?;
        tracing::debug!(%url, "Fetching document");

        let response = self
            .agent
            .get(url)
            .header(
                "User-Agent",
                concat!("mdview/", env!("CARGO_PKG_VERSION")),
            )
            .call()
            .map_err(|e| LoadError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(LoadError::Status {
                status,
                url: url.to_owned(),
            });
        }

        let content = response
            .into_body()
            .read_to_string()
            .map_err(|e| LoadError::Http(e.to_string()))?;
        Ok((content, ImageBase::url(base)))
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn load_file(path: &Path) -> Result<(String, ImageBase), LoadError> {
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let path = std::path::absolute(path).map_err(io_error)?;
    let content = std::fs::read_to_string(&path).map_err(io_error)?;
    let image_base = path.parent().map(ImageBase::path).unwrap_or_default();
    Ok((content, image_base))
}

/// Directory part of a document URL: `scheme://authority` followed by every
/// path segment except the last. Query and fragment are dropped; the port is
/// kept.
///
/// # Errors
///
/// Returns [`LoadError::InvalidUrl`] if `url` has no scheme or no host.
pub fn url_base(url: &str) -> Result<String, LoadError> {
    let invalid = || LoadError::InvalidUrl(url.to_owned());

    let (scheme, rest) = url.split_once("://").ok_or_else(invalid)?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
    let host = authority.rsplit('@').next().unwrap_or_default();
    if scheme.is_empty() || host.is_empty() || host.starts_with(':') {
        return Err(invalid());
    }

    let dir = path.rsplit_once('/').map_or("", |(dir, _)| dir);
    Ok(format!("{scheme}://{host}{dir}"))
}

/// Number of whitespace-separated words in `text`.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}
