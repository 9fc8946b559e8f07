//! Mermaid diagram rendering for markdown display.
//!
//! Diagram blocks are rendered to SVG by an external service, adjusted for a
//! rasterizer that cannot draw embedded HTML, rasterized to PNG, and replaced
//! in the document by a markdown image reference.
//!
//! # Architecture
//!
//! - [`processor`]: `DiagramProcessor`, fence discovery and substitution
//! - [`context`]: per-render `RenderContext` and `Theme`
//! - [`kind`]: diagram type detection
//! - [`normalize`]: source cleanup before rendering
//! - [`kroki`]: `DiagramRenderer` trait and the Kroki HTTP implementation
//! - [`svg`]: `<foreignObject>` replacement and default fill cleanup
//! - [`rasterize`]: `Rasterizer` trait and the resvg implementation
//! - [`assets`]: process-lifetime image directory

pub mod assets;
mod consts;
pub mod context;
mod error;
pub mod kind;
pub mod kroki;
pub mod normalize;
pub mod processor;
pub mod rasterize;
pub mod svg;

pub use assets::DiagramAssets;
pub use consts::{DEFAULT_KROKI_URL, DEFAULT_RASTER_TIMEOUT, DEFAULT_SCALE, DEFAULT_TIMEOUT};
pub use context::{RenderContext, Theme};
pub use error::DiagramError;
pub use kind::DiagramKind;
pub use kroki::{DiagramRenderer, KrokiRenderer};
pub use normalize::normalize_source;
pub use processor::DiagramProcessor;
pub use rasterize::{Rasterizer, ResvgRasterizer};
pub use svg::prepare_svg;
