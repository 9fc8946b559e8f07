//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default Kroki server.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for rasterizing one diagram (30 seconds).
pub const DEFAULT_RASTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Supersampling multiplier for rasterized diagrams.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Vertical shift applied to label text so it sits on the node's visual center.
pub const BASELINE_OFFSET: f64 = 5.0;

/// Label text color on dark backgrounds.
pub const DARK_TEXT_COLOR: &str = "#e6e6e6";

/// Label text color on light backgrounds.
pub const LIGHT_TEXT_COLOR: &str = "#1f2328";

/// Font stack for rewritten labels.
pub const LABEL_FONT_FAMILY: &str = "sans-serif";

/// Label font size in user units.
pub const LABEL_FONT_SIZE: &str = "14";
