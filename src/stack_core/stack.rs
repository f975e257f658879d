//! Stack facade module
//!
//! Orchestrates codec, resolver and normalizer behind the interface the
//! rendering/UI layer consumes.

mod image_stack;

pub use image_stack::{ImageStack, ProgressCallback};
