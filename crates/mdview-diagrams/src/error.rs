//! Diagram rendering errors.

use std::time::Duration;

/// Failure while turning one diagram block into an image.
///
/// Errors never abort a document render; the processor turns them into an
/// inline diagnostic. The `Display` text is what the reader sees there.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// Transport-level failure talking to the renderer service.
    #[error("HTTP error: {0}")]
    Http(String),
    /// The renderer service answered with an error status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The renderer produced something that is not usable SVG.
    #[error("invalid SVG: {0}")]
    InvalidSvg(String),
    /// SVG parsing, rendering or PNG encoding failed.
    #[error("rasterization failed: {0}")]
    Raster(String),
    /// A collaborator did not finish in time.
    #[error("{stage} timed out after {}s", .timeout.as_secs())]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiagramError {
    /// Whether the message points at a problem in the diagram source itself.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        const INDICATORS: &[&str] = &[
            "parse error",
            "syntax error",
            "lexical error",
            "unexpected",
            "expecting",
        ];
        let message = self.to_string().to_lowercase();
        INDICATORS.iter().any(|needle| message.contains(needle))
    }
}
