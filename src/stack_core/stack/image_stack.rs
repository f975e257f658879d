use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::stack_core::codec::{
    ContainerDims, PixelType, PlaneSink, PlaneSource, SaveConfig, SeriesView, TiffContainer,
    TiffSink,
};
use crate::stack_core::common::error::{Result, StackError};
use crate::stack_core::display::{DisplayImage, PerPlaneMinMax, ScalePolicy, normalize_plane};
use crate::stack_core::metadata::{ChannelParams, ImageMetadata};
use crate::stack_core::resolve::PlaneResolver;

/// Progress hook for long-running save operations, invoked as
/// `(planes_written, total_planes)`. Returning false cancels the save
/// before the next plane is written; the destination is then incomplete
/// and must be discarded by the caller.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(usize, usize) -> bool;

/// On-demand view over one open multi-dimensional image container.
///
/// Construction opens the container, dropping the stack closes it. Plane
/// reads are synchronous and produce a fresh [`DisplayImage`] per call;
/// there is no caching. One stack must not be used from several threads
/// at once, but independently opened stacks are fully independent.
pub struct ImageStack<S: PlaneSource> {
    source: S,
    resolver: PlaneResolver,
    view: SeriesView,
    path: Option<PathBuf>,
    scale_policy: Box<dyn ScalePolicy>,
}

impl ImageStack<TiffContainer> {
    /// Open a TIFF or OME-TIFF file from disk.
    pub fn open_tiff<P: AsRef<Path>>(path: P) -> Result<Self> {
        let container = TiffContainer::open(&path)?;
        let mut stack = Self::from_source(container);
        stack.path = Some(path.as_ref().to_path_buf());
        Ok(stack)
    }
}

impl<S: PlaneSource> ImageStack<S> {
    /// Wrap an already-opened plane source.
    pub fn from_source(source: S) -> Self {
        let view = SeriesView::default();
        let resolver = PlaneResolver::for_source(&source, view);
        Self {
            source,
            resolver,
            view,
            path: None,
            scale_policy: Box::new(PerPlaneMinMax),
        }
    }

    pub fn view(&self) -> SeriesView {
        self.view
    }

    pub fn is_self_describing(&self) -> bool {
        self.source.is_self_describing()
    }

    pub fn pixel_type(&self) -> PixelType {
        self.source.pixel_type()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Dimensions after applying the interleaving interpretation.
    pub fn effective_dims(&self) -> ContainerDims {
        self.resolver.effective_dims()
    }

    pub fn raw_image_count(&self) -> usize {
        self.resolver.raw_image_count()
    }

    pub fn interleaved_channel_count(&self) -> usize {
        self.resolver.interleaved_channel_count()
    }

    /// Reinterpret the raw plane sequence as `channel_count` interleaved
    /// channels. Only permitted on non-self-describing containers and
    /// only when the count divides evenly into the raw plane count.
    pub fn set_interleaved_channel_count(&mut self, channel_count: usize) -> Result<()> {
        self.resolver.set_interleaved_channel_count(channel_count)
    }

    /// Swap the normalization policy for the scaling pixel types.
    pub fn set_scale_policy(&mut self, policy: Box<dyn ScalePolicy>) {
        self.scale_policy = policy;
    }

    /// Physical plane index for a logical (z, c, t) coordinate.
    pub fn plane_index(&self, z: usize, c: usize, t: usize) -> Result<usize> {
        self.resolver.plane_index(&self.source, self.view, z, c, t)
    }

    /// Read one plane by logical coordinate and normalize it for display.
    ///
    /// Never fails: bad coordinates, codec errors and undisplayable pixel
    /// types degrade to an empty image with a logged diagnostic, so one
    /// unreadable plane does not end a browsing session.
    pub fn read_plane(&mut self, z: usize, c: usize, t: usize) -> DisplayImage {
        match self.plane_index(z, c, t) {
            Ok(index) => self.read_plane_by_index(index),
            Err(e) => {
                warn!(z, c, t, "Cannot resolve plane: {e}");
                DisplayImage::default()
            }
        }
    }

    /// Read one plane by physical index and normalize it for display.
    pub fn read_plane_by_index(&mut self, plane_index: usize) -> DisplayImage {
        let dims = self.resolver.effective_dims();
        match self.source.open_plane(self.view, plane_index) {
            Ok(plane) => {
                normalize_plane(&plane, dims.size_x, dims.size_y, self.scale_policy.as_ref())
            }
            Err(e) => {
                warn!(plane_index, "Failed to read plane: {e}");
                DisplayImage::default()
            }
        }
    }

    /// Build descriptive metadata from what the container reports:
    /// effective dimensions, pixel type, file name and size, and one
    /// default-named entry per effective channel.
    pub fn extract_metadata(&self) -> ImageMetadata {
        let dims = self.resolver.effective_dims();
        let mut meta = ImageMetadata {
            size_x: dims.size_x,
            size_y: dims.size_y,
            size_z: dims.size_z,
            size_c: dims.size_c,
            size_t: dims.size_t,
            pixel_type: Some(self.source.pixel_type()),
            ..Default::default()
        };

        if let Some(path) = &self.path {
            meta.image_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            meta.data_size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        }

        for c in 0..dims.size_c {
            meta.channels.push(ChannelParams {
                name: format!("Channel {}", c + 1),
                ..Default::default()
            });
        }
        meta
    }

    /// Write all planes plus metadata into `sink`.
    ///
    /// Under an active interleaving override, planes leave in canonical
    /// order (T outermost, C next, Z fastest) and each output plane index
    /// is the sequential enumeration counter, never the raw source index.
    /// Without an override the raw plane sequence is copied verbatim.
    ///
    /// The progress callback is reported after every plane and may cancel
    /// the save before the next one; the partially-written destination is
    /// the caller's to discard.
    #[instrument(skip(self, sink, metadata, progress))]
    pub fn save_with_metadata<K: PlaneSink>(
        &mut self,
        sink: &mut K,
        metadata: &ImageMetadata,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        let dims = self.resolver.effective_dims();
        let total = dims.image_count;

        sink.write_metadata(metadata)?;

        if self.resolver.override_active() {
            let coords: Vec<_> = self.resolver.save_order().collect();
            for (out_index, coord) in coords.into_iter().enumerate() {
                let raw_index =
                    self.resolver
                        .plane_index(&self.source, self.view, coord.z, coord.c, coord.t)?;
                let plane = self.source.open_plane(self.view, raw_index)?;
                sink.write_plane(out_index, &plane)?;
                if let Some(cb) = progress.as_mut() {
                    if !cb(out_index + 1, total) {
                        return Err(StackError::Cancelled {
                            written: out_index + 1,
                            total,
                        });
                    }
                }
            }
        } else {
            for plane_index in 0..total {
                let plane = self.source.open_plane(self.view, plane_index)?;
                sink.write_plane(plane_index, &plane)?;
                if let Some(cb) = progress.as_mut() {
                    if !cb(plane_index + 1, total) {
                        return Err(StackError::Cancelled {
                            written: plane_index + 1,
                            total,
                        });
                    }
                }
            }
        }

        sink.finish()?;
        info!(planes = total, "Saved stack");
        Ok(())
    }

    /// Convenience wrapper writing to a TIFF file on disk.
    ///
    /// The destination is written in place; callers wanting an atomic
    /// replace should pass a temporary path and rename after success.
    pub fn save_to_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        metadata: &ImageMetadata,
        config: &SaveConfig,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<()> {
        let dims = self.resolver.effective_dims();
        let mut sink = TiffSink::create(path, dims.size_x, dims.size_y, config)?;
        self.save_with_metadata(&mut sink, metadata, progress)
    }
}
