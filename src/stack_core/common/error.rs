use thiserror::Error;

use crate::stack_core::codec::PixelType;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Interleaved channel count {channels} does not divide evenly into image count {image_count}")]
    DimensionMismatch { channels: usize, image_count: usize },

    #[error("Plane coordinate out of range: z={z}, c={c}, t={t}")]
    CoordinateOutOfRange { z: usize, c: usize, t: usize },

    #[error("Pixel type {0:?} is not supported")]
    UnsupportedPixelType(PixelType),

    #[error("Failed to read plane data: {0}")]
    ReadFailure(String),

    #[error("Failed to write plane data: {0}")]
    WriteFailure(String),

    #[error("Save cancelled after writing {written} of {total} planes")]
    Cancelled { written: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StackError>;
