//! Microscopy stack core module
//!
//! This module contains the dimension-interpretation and pixel-plane
//! access layer: the codec seams, the plane index resolver, the pixel
//! normalizer and the stack facade tying them together.

pub mod codec;
pub mod common;
pub mod display;
pub mod metadata;
pub mod resolve;
pub mod stack;

#[cfg(test)]
mod tests;

pub use common::{Result, StackError};

pub use codec::{
    ContainerDims,
    PixelType,
    PlaneBuffer,
    PlaneSink,
    PlaneSource,
    SaveConfig,
    SaveConfigBuilder,
    SeriesView,
    TiffCompression,
    TiffContainer,
    TiffSink,
};

pub use display::{ContrastWindow, DisplayImage, FixedRange, PerPlaneMinMax, ScalePolicy};

pub use metadata::{ChannelParams, ImageMetadata};

pub use resolve::PlaneResolver;

pub use stack::{ImageStack, ProgressCallback};
