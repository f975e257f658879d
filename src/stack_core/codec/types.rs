//! Container-level data types shared between codec, resolver and display.

/// Dimension tuple for one series/resolution of an open container.
///
/// For OME-TIFF containers with trustworthy metadata,
/// `image_count == size_z * size_t * size_c`. Raw TIFFs may violate this,
/// which is exactly what the interleaving reinterpretation exists to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerDims {
    /// Width in pixels
    pub size_x: usize,
    /// Height in pixels
    pub size_y: usize,
    /// Number of Z (focal) positions
    pub size_z: usize,
    /// Number of timepoints
    pub size_t: usize,
    /// Number of channels
    pub size_c: usize,
    /// Total flat plane count
    pub image_count: usize,
    /// Samples per pixel (1 for grayscale, 3 for RGB)
    pub rgb_channel_count: usize,
}

/// Explicit (series, resolution) selector passed to every codec call.
///
/// Replaces a mutable "current series" cursor on the container handle, so
/// two logical views of the same file never race on shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeriesView {
    pub series: usize,
    pub resolution: usize,
}

/// Element encoding of a raw plane buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Float,
    Double,
    Bit,
    Complex,
    DoubleComplex,
}

impl PixelType {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PixelType::Uint8 | PixelType::Int8 | PixelType::Bit => 1,
            PixelType::Uint16 | PixelType::Int16 => 2,
            PixelType::Uint32 | PixelType::Int32 | PixelType::Float => 4,
            PixelType::Double | PixelType::Complex => 8,
            PixelType::DoubleComplex => 16,
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelType::Uint8 => "uint8",
            PixelType::Int8 => "int8",
            PixelType::Uint16 => "uint16",
            PixelType::Int16 => "int16",
            PixelType::Uint32 => "uint32",
            PixelType::Int32 => "int32",
            PixelType::Float => "float",
            PixelType::Double => "double",
            PixelType::Bit => "bit",
            PixelType::Complex => "complex",
            PixelType::DoubleComplex => "double-complex",
        };
        f.write_str(name)
    }
}

/// One raw plane as delivered by the codec, tagged by element type.
///
/// The normalizer matches this exhaustively; adding a variant forces a
/// corresponding match arm at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneBuffer {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Bit(Vec<bool>),
    ComplexF32(Vec<[f32; 2]>),
    ComplexF64(Vec<[f64; 2]>),
}

impl PlaneBuffer {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            PlaneBuffer::U8(_) => PixelType::Uint8,
            PlaneBuffer::I8(_) => PixelType::Int8,
            PlaneBuffer::U16(_) => PixelType::Uint16,
            PlaneBuffer::I16(_) => PixelType::Int16,
            PlaneBuffer::U32(_) => PixelType::Uint32,
            PlaneBuffer::I32(_) => PixelType::Int32,
            PlaneBuffer::F32(_) => PixelType::Float,
            PlaneBuffer::F64(_) => PixelType::Double,
            PlaneBuffer::Bit(_) => PixelType::Bit,
            PlaneBuffer::ComplexF32(_) => PixelType::Complex,
            PlaneBuffer::ComplexF64(_) => PixelType::DoubleComplex,
        }
    }

    /// Number of samples in the buffer.
    pub fn len(&self) -> usize {
        match self {
            PlaneBuffer::U8(v) => v.len(),
            PlaneBuffer::I8(v) => v.len(),
            PlaneBuffer::U16(v) => v.len(),
            PlaneBuffer::I16(v) => v.len(),
            PlaneBuffer::U32(v) => v.len(),
            PlaneBuffer::I32(v) => v.len(),
            PlaneBuffer::F32(v) => v.len(),
            PlaneBuffer::F64(v) => v.len(),
            PlaneBuffer::Bit(v) => v.len(),
            PlaneBuffer::ComplexF32(v) => v.len(),
            PlaneBuffer::ComplexF64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
