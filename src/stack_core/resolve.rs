//! Plane index resolution module
//!
//! Translates logical (Z, C, T) coordinates into physical plane indices,
//! including the interleaved-channel reinterpretation of raw TIFFs.

mod resolver;

pub use resolver::{PlaneCoord, PlaneResolver};
