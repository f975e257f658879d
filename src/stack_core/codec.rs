//! Container codec module
//!
//! This module defines the narrow interface through which the core
//! consumes TIFF/OME-TIFF containers, plus concrete implementations
//! backed by the `tiff` crate.

mod config;
mod sink;
mod source;
mod tiff_sink;
mod tiff_source;
pub mod types;

pub use config::{SaveConfig, SaveConfigBuilder, TiffCompression};
pub use sink::PlaneSink;
pub use source::PlaneSource;
pub use tiff_sink::TiffSink;
pub use tiff_source::TiffContainer;
pub use types::{ContainerDims, PixelType, PlaneBuffer, SeriesView};
