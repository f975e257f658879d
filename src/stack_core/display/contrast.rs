use bytemuck::cast_slice;

use crate::stack_core::display::image::DisplayImage;

/// Consumer-side contrast mapping: a [min, max] pixel-value window
/// applied as a linear rescale-and-clamp over an already-normalized
/// display buffer.
///
/// This is independent of, and in addition to, the per-plane min-max
/// normalization done while producing the buffer; the two must not be
/// conflated. The renderer applies the same mapping in its fragment
/// shader, this CPU version exists for consumers without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContrastWindow {
    min: i64,
    max: i64,
}

impl ContrastWindow {
    /// A reversed range is swapped rather than rejected.
    pub fn new(min: i64, max: i64) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn range(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    /// Rescale every sample so `min` maps to 0 and `max` to full scale,
    /// clamping values outside the window. A degenerate window
    /// (min == max) leaves the image unchanged, mirroring the renderer.
    pub fn apply(&self, image: &DisplayImage) -> DisplayImage {
        if image.is_empty() || self.max <= self.min {
            return image.clone();
        }

        let mut out = image.clone();
        match image.bytes_per_channel {
            1 => {
                for b in &mut out.data {
                    *b = self.map_sample(*b as f64, 255.0) as u8;
                }
            }
            2 => {
                let mapped: Vec<u16> = image
                    .data
                    .chunks_exact(2)
                    .map(|b| {
                        let s = u16::from_ne_bytes([b[0], b[1]]);
                        self.map_sample(s as f64, 65535.0) as u16
                    })
                    .collect();
                out.data = cast_slice(&mapped).to_vec();
            }
            _ => {}
        }
        out
    }

    fn map_sample(&self, value: f64, full_scale: f64) -> f64 {
        let scaled = (value - self.min as f64) / (self.max - self.min) as f64;
        (scaled.clamp(0.0, 1.0) * full_scale).round()
    }
}
