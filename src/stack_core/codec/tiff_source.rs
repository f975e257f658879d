//! TIFF container reader backed by the `tiff` crate.
//!
//! Treats every IFD in the file as one plane. For OME-TIFF files
//! (recognized by the `.ome.tif`/`.ome.tiff` extension) the effective
//! Z/C/T split and dimension order are sniffed from the OME attributes
//! embedded in the ImageDescription tag; raw TIFFs are reported as a flat
//! Z stack and left to the resolver's interleaving reinterpretation.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::stack_core::codec::source::PlaneSource;
use crate::stack_core::codec::types::{ContainerDims, PixelType, PlaneBuffer, SeriesView};
use crate::stack_core::common::error::{Result, StackError};

pub struct TiffContainer {
    decoder: Decoder<BufReader<File>>,
    path: PathBuf,
    ome: bool,
    dims: ContainerDims,
    pixel_type: PixelType,
    // Z/C/T axes in storage order, innermost (fastest-varying) first.
    // Derived from the OME DimensionOrder attribute, default XYZCT.
    axis_order: [Axis; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Z,
    C,
    T,
}

impl TiffContainer {
    /// Open a TIFF or OME-TIFF file and probe its plane layout.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let mut decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| StackError::ReadFailure(format!("{}: {}", path.display(), e)))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| StackError::ReadFailure(e.to_string()))?;
        let colortype = decoder
            .colortype()
            .map_err(|e| StackError::ReadFailure(e.to_string()))?;
        let rgb_channel_count = match colortype {
            ColorType::RGB(_) => 3,
            ColorType::RGBA(_) => 4,
            _ => 1,
        };

        let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();

        // Probe the element encoding from the first plane.
        let first = decoder
            .read_image()
            .map_err(|e| StackError::ReadFailure(e.to_string()))?;
        let pixel_type = decoding_result_to_plane(first)?.pixel_type();

        // Walk the IFD chain to count planes.
        let mut image_count = 1usize;
        while decoder.more_images() {
            decoder
                .next_image()
                .map_err(|e| StackError::ReadFailure(e.to_string()))?;
            image_count += 1;
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let ome = {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".ome.tiff") || lower.ends_with(".ome.tif")
        };

        let mut dims = ContainerDims {
            size_x: width as usize,
            size_y: height as usize,
            size_z: image_count,
            size_t: 1,
            size_c: 1,
            image_count,
            rgb_channel_count,
        };
        let mut axis_order = [Axis::Z, Axis::C, Axis::T];

        if ome {
            if let Some(desc) = &description {
                if let Some(z) = ome_attr(desc, "SizeZ") {
                    dims.size_z = z;
                }
                if let Some(c) = ome_attr(desc, "SizeC") {
                    dims.size_c = c;
                }
                if let Some(t) = ome_attr(desc, "SizeT") {
                    dims.size_t = t;
                }
                if let Some(order) = ome_attr_str(desc, "DimensionOrder") {
                    if let Some(parsed) = parse_axis_order(&order) {
                        axis_order = parsed;
                    }
                }
            }
        }

        debug!(
            path = %path.display(),
            ome,
            width,
            height,
            image_count,
            pixel_type = %pixel_type,
            "Opened TIFF container"
        );

        Ok(Self {
            decoder,
            path,
            ome,
            dims,
            pixel_type,
            axis_order,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlaneSource for TiffContainer {
    fn dims(&self, _view: SeriesView) -> ContainerDims {
        // Single-series containers only; the view is accepted for
        // interface uniformity.
        self.dims
    }

    fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    fn is_self_describing(&self) -> bool {
        self.ome
    }

    fn native_index(&self, _view: SeriesView, z: usize, c: usize, t: usize) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for axis in self.axis_order {
            let (value, size) = match axis {
                Axis::Z => (z, self.dims.size_z),
                Axis::C => (c, self.dims.size_c),
                Axis::T => (t, self.dims.size_t),
            };
            index += value * stride;
            stride *= size.max(1);
        }
        index
    }

    fn open_plane(&mut self, _view: SeriesView, plane_index: usize) -> Result<PlaneBuffer> {
        if plane_index >= self.dims.image_count {
            return Err(StackError::ReadFailure(format!(
                "plane index {} out of range (container has {} planes)",
                plane_index, self.dims.image_count
            )));
        }

        self.decoder
            .seek_to_image(plane_index)
            .map_err(|e| StackError::ReadFailure(e.to_string()))?;
        let result = self
            .decoder
            .read_image()
            .map_err(|e| StackError::ReadFailure(e.to_string()))?;
        decoding_result_to_plane(result)
    }
}

fn decoding_result_to_plane(result: DecodingResult) -> Result<PlaneBuffer> {
    match result {
        DecodingResult::U8(v) => Ok(PlaneBuffer::U8(v)),
        DecodingResult::U16(v) => Ok(PlaneBuffer::U16(v)),
        DecodingResult::U32(v) => Ok(PlaneBuffer::U32(v)),
        DecodingResult::I8(v) => Ok(PlaneBuffer::I8(v)),
        DecodingResult::I16(v) => Ok(PlaneBuffer::I16(v)),
        DecodingResult::I32(v) => Ok(PlaneBuffer::I32(v)),
        DecodingResult::F32(v) => Ok(PlaneBuffer::F32(v)),
        DecodingResult::F64(v) => Ok(PlaneBuffer::F64(v)),
        other => Err(StackError::ReadFailure(format!(
            "sample encoding not supported: {:?}",
            sample_kind(&other)
        ))),
    }
}

fn sample_kind(result: &DecodingResult) -> &'static str {
    match result {
        DecodingResult::U8(_) => "u8",
        DecodingResult::U16(_) => "u16",
        DecodingResult::U32(_) => "u32",
        DecodingResult::U64(_) => "u64",
        DecodingResult::I8(_) => "i8",
        DecodingResult::I16(_) => "i16",
        DecodingResult::I32(_) => "i32",
        DecodingResult::I64(_) => "i64",
        DecodingResult::F32(_) => "f32",
        DecodingResult::F64(_) => "f64",
        _ => "unknown",
    }
}

/// Pull a numeric OME attribute like `SizeZ="42"` out of an
/// ImageDescription blob without a full XML parse.
fn ome_attr(xml: &str, name: &str) -> Option<usize> {
    ome_attr_str(xml, name)?.parse().ok()
}

fn ome_attr_str(xml: &str, name: &str) -> Option<String> {
    let needle = format!("{}=\"", name);
    let start = xml.find(&needle)? + needle.len();
    let end = xml[start..].find('"')? + start;
    Some(xml[start..end].to_string())
}

fn parse_axis_order(order: &str) -> Option<[Axis; 3]> {
    let order = order.to_ascii_uppercase();
    if !order.starts_with("XY") || order.len() != 5 {
        return None;
    }
    let mut axes = [Axis::Z; 3];
    for (i, ch) in order[2..].chars().enumerate() {
        axes[i] = match ch {
            'Z' => Axis::Z,
            'C' => Axis::C,
            'T' => Axis::T,
            _ => return None,
        };
    }
    // Each axis must occur exactly once.
    if axes.contains(&Axis::Z) && axes.contains(&Axis::C) && axes.contains(&Axis::T) {
        Some(axes)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ome_attrs_are_sniffed_from_description() {
        let desc = r#"<Pixels DimensionOrder="XYCZT" SizeC="2" SizeT="3" SizeX="64" SizeY="64" SizeZ="5">"#;
        assert_eq!(ome_attr(desc, "SizeZ"), Some(5));
        assert_eq!(ome_attr(desc, "SizeC"), Some(2));
        assert_eq!(ome_attr(desc, "SizeT"), Some(3));
        assert_eq!(ome_attr_str(desc, "DimensionOrder").as_deref(), Some("XYCZT"));
        assert_eq!(ome_attr(desc, "SizeQ"), None);
    }

    #[test]
    fn axis_order_parses_all_permutations() {
        assert_eq!(parse_axis_order("XYZCT"), Some([Axis::Z, Axis::C, Axis::T]));
        assert_eq!(parse_axis_order("XYZTC"), Some([Axis::Z, Axis::T, Axis::C]));
        assert_eq!(parse_axis_order("XYCZT"), Some([Axis::C, Axis::Z, Axis::T]));
        assert_eq!(parse_axis_order("XYCTZ"), Some([Axis::C, Axis::T, Axis::Z]));
        assert_eq!(parse_axis_order("XYTZC"), Some([Axis::T, Axis::Z, Axis::C]));
        assert_eq!(parse_axis_order("XYTCZ"), Some([Axis::T, Axis::C, Axis::Z]));
        assert_eq!(parse_axis_order("ZYXCT"), None);
        assert_eq!(parse_axis_order("XYZZT"), None);
    }
}
