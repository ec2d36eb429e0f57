//! Radial gauge geometry and rendering.
//!
//! A [`Gauge`] measures its container once, turns a [`GaugeConfig`] into a
//! [`DrawPlan`] of tick strokes, mark labels, segment arcs, a pointer glyph
//! and an optional caption, and hands the plan to a [`Renderer`]. After that
//! only [`Gauge::set_value`] runs, and it only rotates the pointer.
//!
//! ```
//! use radial_gauge::{Gauge, GaugeConfig, Size, SvgRenderer, Theme};
//!
//! let config = GaugeConfig::builder()
//!     .from(0.0)
//!     .to(8000.0)
//!     .step(1000.0)
//!     .segments(vec![6000.0, 7000.0])
//!     .label("RPM")
//!     .build();
//! let mut gauge = Gauge::new(&Size::new(240.0, 240.0), config, SvgRenderer::new(Theme::default()))?;
//! assert_eq!(gauge.set_value(9000.0), 8000.0);
//! assert!(gauge.renderer().to_document().contains("rotate(135deg)"));
//! # Ok::<(), radial_gauge::GaugeError>(())
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod gauge;
pub mod geometry;
pub mod logging;
pub mod raster;
pub mod svg;
pub mod viewer;

pub use binding::{Attach, Binding, GaugeRegistry};
pub use config::{Color, GaugeConfig, GaugeOptions, MarkFormat, RadiusProfile, Theme};
pub use error::{GaugeError, Result};
pub use gauge::{Gauge, Renderer, SizeProvider};
pub use geometry::{
    normalize_segments, Direction, DrawCommand, DrawPlan, GeometryBuilder, Path, PathCommand,
    Point, Pointer, PrimitiveId, Rotation, SegmentArc, Size,
};
pub use raster::{Canvas, PixelRenderer};
pub use svg::SvgRenderer;
pub use viewer::{GaugeCommand, ViewerConfig};
