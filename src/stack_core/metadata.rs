//! Descriptive microscopy metadata module
//!
//! User-editable image- and channel-level parameters carried alongside
//! the pixel data. Consumed and produced as plain structs; the core does
//! not reinterpret them.

mod types;

pub use types::{AcquisitionMode, ChannelParams, ImageMetadata, Immersion, Medium};
