//! Display buffer module
//!
//! Converts raw typed plane buffers into renderer-ready byte buffers and
//! provides the consumer-side contrast window.

mod contrast;
mod image;
mod normalize;

pub use contrast::ContrastWindow;
pub use image::DisplayImage;
pub use normalize::{FixedRange, PerPlaneMinMax, ScalePolicy, normalize_plane};
