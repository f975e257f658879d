use crate::stack_core::codec::types::{ContainerDims, PixelType, PlaneBuffer, SeriesView};
use crate::stack_core::common::error::Result;

/// Format-agnostic read side of an open container.
///
/// This is the narrow seam between the stack core and the underlying
/// TIFF/OME-TIFF codec: enumerating planes, reporting dimensions and
/// handing out raw typed plane buffers. All calls take an explicit
/// [`SeriesView`] instead of mutating a "current series" cursor.
pub trait PlaneSource {
    /// Raw dimensions as declared by the container for the given view.
    fn dims(&self, view: SeriesView) -> ContainerDims;

    /// Element encoding of the plane data.
    fn pixel_type(&self) -> PixelType;

    /// Whether the container carries authoritative, self-describing plane
    /// ordering (true for OME-TIFF). Self-describing containers must never
    /// be reinterpreted.
    fn is_self_describing(&self) -> bool;

    /// The container's native (z, c, t) -> flat plane index computation,
    /// honoring its declared dimension order. Used only when no
    /// interleaving override is active.
    fn native_index(&self, view: SeriesView, z: usize, c: usize, t: usize) -> usize;

    /// Read one raw plane. The returned buffer is freshly allocated and
    /// owned by the caller.
    fn open_plane(&mut self, view: SeriesView, plane_index: usize) -> Result<PlaneBuffer>;
}
