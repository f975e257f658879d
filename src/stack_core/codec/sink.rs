use crate::stack_core::codec::types::PlaneBuffer;
use crate::stack_core::common::error::Result;
use crate::stack_core::metadata::ImageMetadata;

/// Format-agnostic write side of a container being produced.
///
/// Planes are handed over in sequential output order (0, 1, 2, ...);
/// the sink never sees raw source indices.
pub trait PlaneSink {
    /// Hand descriptive metadata to the output container. Called once,
    /// before any plane is written.
    fn write_metadata(&mut self, metadata: &ImageMetadata) -> Result<()>;

    /// Write one plane at the given sequential output index.
    fn write_plane(&mut self, out_index: usize, plane: &PlaneBuffer) -> Result<()>;

    /// Flush and finalize the container.
    fn finish(&mut self) -> Result<()>;
}
