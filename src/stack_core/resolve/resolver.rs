use tracing::debug;

use crate::stack_core::codec::{ContainerDims, PlaneSource, SeriesView};
use crate::stack_core::common::error::{Result, StackError};

/// One logical plane position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneCoord {
    pub z: usize,
    pub c: usize,
    pub t: usize,
}

/// Maps logical (Z, C, T) coordinates onto physical plane indices and
/// derives effective dimensions from the raw container dimensions plus
/// the interleaved-channel override.
///
/// The override reinterprets a raw TIFF's flat plane sequence as channels
/// interleaved at a fixed stride: with 2 interleaved channels, plane 0 is
/// (z=0, c=0), plane 1 is (z=0, c=1), plane 2 is (z=1, c=0) and so on.
/// Self-describing (OME-TIFF) containers carry authoritative plane
/// ordering and are never reinterpreted.
#[derive(Debug, Clone)]
pub struct PlaneResolver {
    raw: ContainerDims,
    interleaved_channels: usize,
    interleavable: bool,
}

impl PlaneResolver {
    /// Build a resolver over the raw dimensions of an open container.
    /// `interleavable` is true only for non-OME containers.
    pub fn new(raw: ContainerDims, interleavable: bool) -> Self {
        Self {
            raw,
            interleaved_channels: 1,
            interleavable,
        }
    }

    /// Convenience constructor reading dimensions off a source.
    pub fn for_source<S: PlaneSource>(source: &S, view: SeriesView) -> Self {
        Self::new(source.dims(view), !source.is_self_describing())
    }

    pub fn raw_dims(&self) -> ContainerDims {
        self.raw
    }

    pub fn raw_image_count(&self) -> usize {
        self.raw.image_count
    }

    pub fn interleaved_channel_count(&self) -> usize {
        self.interleaved_channels
    }

    /// True when an interleaving reinterpretation is in effect.
    pub fn override_active(&self) -> bool {
        self.interleaved_channels > 1 && self.interleavable
    }

    /// Set the interleaved channel count hypothesis (1 = no
    /// reinterpretation). Values below 1 are clamped up to 1.
    ///
    /// Fails without any state change when the container is
    /// self-describing, or when the count does not divide evenly into the
    /// raw plane count.
    pub fn set_interleaved_channel_count(&mut self, channel_count: usize) -> Result<()> {
        let channel_count = channel_count.max(1);

        // Never mess with proper OME-TIFF files.
        if !self.interleavable {
            return Err(StackError::InvalidOperation(
                "cannot set interleaved channel count for a self-describing container".to_string(),
            ));
        }

        if self.raw.image_count > 0
            && channel_count > 1
            && self.raw.image_count % channel_count != 0
        {
            return Err(StackError::DimensionMismatch {
                channels: channel_count,
                image_count: self.raw.image_count,
            });
        }

        self.interleaved_channels = channel_count;
        let eff = self.effective_dims();
        debug!(
            channels = channel_count,
            size_z = eff.size_z,
            size_c = eff.size_c,
            size_t = eff.size_t,
            "Set interleaved channel count"
        );
        Ok(())
    }

    /// Dimensions after applying the interleaving interpretation.
    ///
    /// Always derived from (raw dimensions, override), never stored. When
    /// the override is active, the plane count is split across
    /// `interleaved_channels` channels and the time dimension collapses
    /// to 1.
    pub fn effective_dims(&self) -> ContainerDims {
        let mut dims = self.raw;
        if self.override_active() {
            dims.size_c = self.interleaved_channels;
            dims.size_z = self.raw.image_count / self.interleaved_channels;
            dims.size_t = 1;
            dims.image_count = self.raw.image_count;
        }
        dims
    }

    /// Convert a logical (z, c, t) coordinate into the physical plane
    /// index the codec understands.
    ///
    /// Coordinates are validated against the effective sizes and rejected
    /// with `CoordinateOutOfRange` rather than silently producing a bogus
    /// index. Under an active override the index is `z * channels + c`;
    /// t is collapsed and ignored (multi-timepoint interleaved raw TIFFs
    /// cannot currently be addressed by time). Otherwise the container's
    /// native, format-aware index computation applies.
    pub fn plane_index<S: PlaneSource>(
        &self,
        source: &S,
        view: SeriesView,
        z: usize,
        c: usize,
        t: usize,
    ) -> Result<usize> {
        let eff = self.effective_dims();
        if z >= eff.size_z.max(1) || c >= eff.size_c.max(1) || t >= eff.size_t.max(1) {
            return Err(StackError::CoordinateOutOfRange { z, c, t });
        }

        if self.override_active() {
            return Ok(z * self.interleaved_channels + c);
        }

        Ok(source.native_index(view, z, c, t))
    }

    /// Enumerate planes in the canonical OME order (T outermost, C next,
    /// Z varying fastest), as expected by standards-compliant consumers.
    /// The caller writes planes to the output at the sequential position
    /// of each coordinate in this enumeration.
    pub fn save_order(&self) -> impl Iterator<Item = PlaneCoord> + '_ {
        let eff = self.effective_dims();
        (0..eff.size_t.max(1)).flat_map(move |t| {
            (0..eff.size_c.max(1))
                .flat_map(move |c| (0..eff.size_z.max(1)).map(move |z| PlaneCoord { z, c, t }))
        })
    }
}
