/// Normalized, renderer-ready pixel buffer for one plane.
///
/// Owns its byte storage. Constructed fresh per plane request and
/// discarded on the next one; there is no caching layer here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayImage {
    /// Raw pixel bytes, exactly `width * height * channels * bytes_per_channel` long
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Number of channels (1 = grayscale, 3 = RGB, 4 = RGBA)
    pub channels: usize,
    /// Bytes per channel (1 = 8-bit, 2 = 16-bit)
    pub bytes_per_channel: usize,
}

impl DisplayImage {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }

    pub fn data_size(&self) -> usize {
        self.width * self.height * self.channels * self.bytes_per_channel
    }
}
