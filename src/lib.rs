//! Core library for viewing and re-exporting multi-dimensional microscopy
//! image stacks stored in TIFF and OME-TIFF containers.
//!
//! The interesting logic lives in [`stack_core`]: translating logical
//! (Z, C, T) coordinates into physical plane indices (including the
//! interleaved-channel reinterpretation of raw TIFFs) and normalizing
//! arbitrary pixel encodings into display-ready buffers.

pub mod logger;
pub mod stack_core;

pub use stack_core::{
    ContainerDims,
    ContrastWindow,
    DisplayImage,
    ImageMetadata,
    ImageStack,
    PixelType,
    PlaneBuffer,
    Result,
    SaveConfig,
    StackError,
    TiffContainer,
};
