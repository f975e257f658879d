use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::stack_core::codec::{
    ContainerDims, PixelType, PlaneBuffer, PlaneSink, PlaneSource, SaveConfig, SeriesView,
    TiffCompression,
};
use crate::stack_core::common::error::{Result, StackError};
use crate::stack_core::metadata::ImageMetadata;
use crate::stack_core::stack::ImageStack;

struct MockSource {
    dims: ContainerDims,
    ome: bool,
    planes: Vec<PlaneBuffer>,
    fail_reads: bool,
}

impl MockSource {
    /// A raw (non-OME) TIFF of `count` u16 planes, each filled with its
    /// own plane index so reorderings are observable.
    fn raw_stack(width: usize, height: usize, count: usize) -> Self {
        let planes = (0..count)
            .map(|i| PlaneBuffer::U16(vec![i as u16; width * height]))
            .collect();
        Self {
            dims: ContainerDims {
                size_x: width,
                size_y: height,
                size_z: count,
                size_t: 1,
                size_c: 1,
                image_count: count,
                rgb_channel_count: 1,
            },
            ome: false,
            planes,
            fail_reads: false,
        }
    }
}

impl PlaneSource for MockSource {
    fn dims(&self, _view: SeriesView) -> ContainerDims {
        self.dims
    }

    fn pixel_type(&self) -> PixelType {
        self.planes
            .first()
            .map(|p| p.pixel_type())
            .unwrap_or(PixelType::Uint16)
    }

    fn is_self_describing(&self) -> bool {
        self.ome
    }

    fn native_index(&self, _view: SeriesView, z: usize, c: usize, t: usize) -> usize {
        z + self.dims.size_z * (c + self.dims.size_c * t)
    }

    fn open_plane(&mut self, _view: SeriesView, plane_index: usize) -> Result<PlaneBuffer> {
        if self.fail_reads {
            return Err(StackError::ReadFailure("mock read error".to_string()));
        }
        self.planes
            .get(plane_index)
            .cloned()
            .ok_or_else(|| StackError::ReadFailure(format!("no plane {plane_index}")))
    }
}

#[derive(Default)]
struct MemorySink {
    written: Arc<Mutex<Vec<(usize, PlaneBuffer)>>>,
    metadata: Arc<Mutex<Option<ImageMetadata>>>,
    fail_writes: bool,
}

impl PlaneSink for MemorySink {
    fn write_metadata(&mut self, metadata: &ImageMetadata) -> Result<()> {
        *self.metadata.lock().unwrap() = Some(metadata.clone());
        Ok(())
    }

    fn write_plane(&mut self, out_index: usize, plane: &PlaneBuffer) -> Result<()> {
        if self.fail_writes {
            return Err(StackError::WriteFailure("mock write error".to_string()));
        }
        self.written.lock().unwrap().push((out_index, plane.clone()));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

fn first_sample(plane: &PlaneBuffer) -> u16 {
    match plane {
        PlaneBuffer::U16(v) => v[0],
        other => panic!("unexpected plane type {:?}", other.pixel_type()),
    }
}

#[test]
fn deinterleave_scenario() {
    let mut stack = ImageStack::from_source(MockSource::raw_stack(8, 8, 10));

    stack.set_interleaved_channel_count(2).unwrap();
    let dims = stack.effective_dims();
    assert_eq!(dims.size_z, 5);
    assert_eq!(dims.size_c, 2);
    assert_eq!(dims.size_t, 1);
    assert_eq!(dims.image_count, 10);

    assert_eq!(stack.plane_index(3, 1, 0).unwrap(), 7);

    // The displayed plane is the raw plane at the interleaved index,
    // copied through the u16 identity path.
    let image = stack.read_plane(3, 1, 0);
    assert!(!image.is_empty());
    assert_eq!(image.width, 8);
    assert_eq!(image.height, 8);
    assert_eq!(image.bytes_per_channel, 2);
    assert_eq!(image.data[0..2], 7u16.to_ne_bytes());
}

#[test]
fn rejected_override_keeps_previous_interpretation() {
    let mut stack = ImageStack::from_source(MockSource::raw_stack(8, 8, 10));

    let err = stack.set_interleaved_channel_count(3).unwrap_err();
    assert!(matches!(
        err,
        StackError::DimensionMismatch {
            channels: 3,
            image_count: 10
        }
    ));
    let dims = stack.effective_dims();
    assert_eq!(dims.size_c, 1);
    assert_eq!(dims.size_z, 10);
    assert_eq!(stack.interleaved_channel_count(), 1);
}

#[test]
fn ome_containers_cannot_be_reinterpreted() {
    let mut source = MockSource::raw_stack(8, 8, 10);
    source.ome = true;
    let mut stack = ImageStack::from_source(source);

    let err = stack.set_interleaved_channel_count(2).unwrap_err();
    assert!(matches!(err, StackError::InvalidOperation(_)));
}

#[test]
fn read_plane_degrades_to_empty_on_failure() {
    let mut source = MockSource::raw_stack(8, 8, 4);
    source.fail_reads = true;
    let mut stack = ImageStack::from_source(source);

    assert!(stack.read_plane(0, 0, 0).is_empty());
    // Out-of-range coordinates degrade the same way instead of erroring.
    let mut stack = ImageStack::from_source(MockSource::raw_stack(8, 8, 4));
    assert!(stack.read_plane(4, 0, 0).is_empty());
}

#[test]
fn complex_planes_display_as_empty() {
    let mut source = MockSource::raw_stack(2, 2, 1);
    source.planes = vec![PlaneBuffer::ComplexF32(vec![[0.0, 1.0]; 4])];
    let mut stack = ImageStack::from_source(source);
    assert!(stack.read_plane_by_index(0).is_empty());
}

#[test]
fn save_reorders_interleaved_planes_canonically() {
    let mut stack = ImageStack::from_source(MockSource::raw_stack(4, 4, 6));
    stack.set_interleaved_channel_count(2).unwrap();

    let mut sink = MemorySink::default();
    let written = sink.written.clone();
    let metadata = sink.metadata.clone();

    let meta = stack.extract_metadata();
    stack.save_with_metadata(&mut sink, &meta, None).unwrap();

    let written = written.lock().unwrap();
    // Output indices are the sequential enumeration counter.
    let out_indices: Vec<usize> = written.iter().map(|(i, _)| *i).collect();
    assert_eq!(out_indices, vec![0, 1, 2, 3, 4, 5]);
    // Source planes arrive in canonical order: all of channel 0 first
    // (raw planes 0, 2, 4), then channel 1 (raw planes 1, 3, 5).
    let sources: Vec<u16> = written.iter().map(|(_, p)| first_sample(p)).collect();
    assert_eq!(sources, vec![0, 2, 4, 1, 3, 5]);

    assert!(metadata.lock().unwrap().is_some());
}

#[test]
fn save_without_override_copies_raw_order() {
    let mut stack = ImageStack::from_source(MockSource::raw_stack(4, 4, 4));

    let mut sink = MemorySink::default();
    let written = sink.written.clone();

    let meta = stack.extract_metadata();
    stack.save_with_metadata(&mut sink, &meta, None).unwrap();

    let sources: Vec<u16> = written
        .lock()
        .unwrap()
        .iter()
        .map(|(_, p)| first_sample(p))
        .collect();
    assert_eq!(sources, vec![0, 1, 2, 3]);
}

#[test]
fn save_reports_progress_and_cancels_cooperatively() {
    let mut stack = ImageStack::from_source(MockSource::raw_stack(4, 4, 6));
    stack.set_interleaved_channel_count(2).unwrap();

    let mut sink = MemorySink::default();
    let written = sink.written.clone();

    let meta = stack.extract_metadata();
    let mut reports = Vec::new();
    let mut cb = |current: usize, total: usize| {
        reports.push((current, total));
        current < 2
    };
    let err = stack
        .save_with_metadata(&mut sink, &meta, Some(&mut cb))
        .unwrap_err();

    assert!(matches!(err, StackError::Cancelled { written: 2, total: 6 }));
    // The cancellation stops before the third plane is written.
    assert_eq!(written.lock().unwrap().len(), 2);
    assert_eq!(reports, vec![(1, 6), (2, 6)]);
}

#[test]
fn sink_failure_propagates_as_write_failure() {
    let mut stack = ImageStack::from_source(MockSource::raw_stack(4, 4, 2));
    let mut sink = MemorySink {
        fail_writes: true,
        ..Default::default()
    };
    let meta = stack.extract_metadata();
    let err = stack.save_with_metadata(&mut sink, &meta, None).unwrap_err();
    assert!(matches!(err, StackError::WriteFailure(_)));
}

#[test]
fn extracted_metadata_reflects_effective_dimensions() {
    let mut stack = ImageStack::from_source(MockSource::raw_stack(16, 12, 10));
    stack.set_interleaved_channel_count(2).unwrap();

    let meta = stack.extract_metadata();
    assert_eq!(meta.size_x, 16);
    assert_eq!(meta.size_y, 12);
    assert_eq!(meta.size_z, 5);
    assert_eq!(meta.size_c, 2);
    assert_eq!(meta.size_t, 1);
    assert_eq!(meta.pixel_type, Some(PixelType::Uint16));
    assert_eq!(meta.channels.len(), 2);
    assert_eq!(meta.channels[0].name, "Channel 1");
    assert_eq!(meta.channels[1].name, "Channel 2");
}

#[test]
fn tiff_round_trip_preserves_planes_and_dimensions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.ome.tif");

    let mut stack = ImageStack::from_source(MockSource::raw_stack(16, 16, 6));
    stack.set_interleaved_channel_count(2).unwrap();

    let meta = stack.extract_metadata();
    let config = SaveConfig::builder()
        .compression(TiffCompression::DeflateBalanced)
        .build();
    stack
        .save_to_path(&path, &meta, &config, None)
        .unwrap();

    // Reopen through the real codec. The description tag carries the
    // effective Z/C split, so the exported file is self-describing.
    let mut reopened = ImageStack::open_tiff(&path).unwrap();
    assert!(reopened.is_self_describing());
    let dims = reopened.effective_dims();
    assert_eq!(dims.size_x, 16);
    assert_eq!(dims.size_y, 16);
    assert_eq!(dims.size_z, 3);
    assert_eq!(dims.size_c, 2);
    assert_eq!(dims.image_count, 6);
    assert_eq!(reopened.pixel_type(), PixelType::Uint16);

    // Output plane 1 is (z=1, c=0), which was raw source plane 2.
    let image = reopened.read_plane_by_index(1);
    assert!(!image.is_empty());
    assert_eq!(image.data[0..2], 2u16.to_ne_bytes());

    // Reinterpreting the self-describing export is refused.
    assert!(reopened.set_interleaved_channel_count(3).is_err());
}
