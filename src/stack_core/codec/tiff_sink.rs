use std::fs::File;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype, compression::DeflateLevel};
use tiff::tags::Tag;
use tracing::debug;

use crate::stack_core::codec::config::{SaveConfig, TiffCompression};
use crate::stack_core::codec::sink::PlaneSink;
use crate::stack_core::codec::types::PlaneBuffer;
use crate::stack_core::common::error::{Result, StackError};
use crate::stack_core::metadata::ImageMetadata;

/// Multi-page TIFF writer backed by the `tiff` crate encoder.
///
/// Grayscale unsigned-integer and float planes are written natively; the
/// encoder has no color type for signed-integer, bilevel or complex
/// samples, so those surface an `UnsupportedPixelType` error.
pub struct TiffSink {
    encoder: TiffEncoder<File>,
    width: u32,
    height: u32,
    description: Option<String>,
    planes_written: usize,
}

impl TiffSink {
    pub fn create<P: AsRef<Path>>(
        path: P,
        width: usize,
        height: usize,
        config: &SaveConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| StackError::WriteFailure(format!("{}: {}", path.display(), e)))?;

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => {
                tiff::encoder::Compression::Deflate(DeflateLevel::Balanced)
            }
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(file)
            .map_err(|e| StackError::WriteFailure(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => tiff::tags::Predictor::Horizontal,
                _ => tiff::tags::Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        debug!(path = %path.display(), width, height, "Created TIFF output container");

        Ok(Self {
            encoder,
            width: width as u32,
            height: height as u32,
            description: None,
            planes_written: 0,
        })
    }

    fn write_typed<C>(&mut self, data: &[C::Inner]) -> Result<()>
    where
        C: colortype::ColorType,
        [C::Inner]: tiff::encoder::TiffValue,
    {
        let mut image = self
            .encoder
            .new_image::<C>(self.width, self.height)
            .map_err(|e| StackError::WriteFailure(e.to_string()))?;

        // The description tag goes on the first directory only.
        if self.planes_written == 0 {
            if let Some(desc) = &self.description {
                image
                    .encoder()
                    .write_tag(Tag::ImageDescription, desc.as_str())
                    .map_err(|e| StackError::WriteFailure(e.to_string()))?;
            }
        }

        image
            .write_data(data)
            .map_err(|e| StackError::WriteFailure(e.to_string()))?;
        Ok(())
    }
}

impl PlaneSink for TiffSink {
    fn write_metadata(&mut self, metadata: &ImageMetadata) -> Result<()> {
        self.description = Some(metadata.to_description());
        Ok(())
    }

    fn write_plane(&mut self, out_index: usize, plane: &PlaneBuffer) -> Result<()> {
        if out_index != self.planes_written {
            return Err(StackError::WriteFailure(format!(
                "planes must be written sequentially (expected index {}, got {})",
                self.planes_written, out_index
            )));
        }

        let expected = self.width as usize * self.height as usize;
        if plane.len() != expected {
            return Err(StackError::WriteFailure(format!(
                "plane has {} samples, container expects {}",
                plane.len(),
                expected
            )));
        }

        match plane {
            PlaneBuffer::U8(v) => self.write_typed::<colortype::Gray8>(v)?,
            PlaneBuffer::U16(v) => self.write_typed::<colortype::Gray16>(v)?,
            PlaneBuffer::U32(v) => self.write_typed::<colortype::Gray32>(v)?,
            PlaneBuffer::F32(v) => self.write_typed::<colortype::Gray32Float>(v)?,
            PlaneBuffer::F64(v) => self.write_typed::<colortype::Gray64Float>(v)?,
            PlaneBuffer::I8(_)
            | PlaneBuffer::I16(_)
            | PlaneBuffer::I32(_)
            | PlaneBuffer::Bit(_)
            | PlaneBuffer::ComplexF32(_)
            | PlaneBuffer::ComplexF64(_) => {
                // The tiff encoder has no color type for these samples.
                return Err(StackError::UnsupportedPixelType(plane.pixel_type()));
            }
        }

        self.planes_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        debug!(planes = self.planes_written, "Finalized TIFF output");
        Ok(())
    }
}
