//! Mermaid to SVG rendering via the Kroki service.

use std::time::Duration;

use ureq::Agent;

use crate::consts::{DEFAULT_KROKI_URL, DEFAULT_TIMEOUT};
use crate::error::DiagramError;

/// Turns normalized Mermaid source into an SVG document.
pub trait DiagramRenderer: Send + Sync {
    /// Render `source` to SVG markup.
    fn render_svg(&self, source: &str) -> Result<String, DiagramError>;
}

/// [`DiagramRenderer`] backed by a Kroki server (`POST {url}/mermaid/svg`).
pub struct KrokiRenderer {
    server_url: String,
    agent: Agent,
}

impl KrokiRenderer {
    /// Create a renderer for the given Kroki server with the default 30 second timeout.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_owned();
        Self {
            server_url,
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set the HTTP timeout for each request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Kroki server URL, without trailing slash.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

impl Default for KrokiRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_KROKI_URL)
    }
}

impl DiagramRenderer for KrokiRenderer {
    fn render_svg(&self, source: &str) -> Result<String, DiagramError> {
        let url = format!("{}/mermaid/svg", self.server_url);
        tracing::debug!(%url, bytes = source.len(), "Rendering diagram via Kroki");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())
            .map_err(|e| DiagramError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(DiagramError::Status {
                status,
                body: error_body.trim().to_owned(),
            });
        }

        let data = body
            .read_to_vec()
            .map_err(|e| DiagramError::Http(e.to_string()))?;
        String::from_utf8(data).map_err(|e| DiagramError::InvalidSvg(format!("invalid UTF-8: {e}")))
    }
}

/// Create HTTP agent with the specified timeout.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}
