//! Per-type conversion of raw plane buffers into display buffers.
//!
//! Unsigned 8/16-bit samples are copied as-is, signed 8/16-bit samples are
//! shifted to the unsigned midpoint, wider integer and float samples are
//! min-max scaled into the 16-bit range, booleans become 0/255. Complex
//! samples have no display representation and yield an empty buffer.

use bytemuck::cast_slice;
use tracing::warn;

use crate::stack_core::codec::PlaneBuffer;
use crate::stack_core::display::image::DisplayImage;

/// Policy deciding which input value range is mapped onto [0, 65535] for
/// the scaling pixel types (u32/i32/f32/f64).
///
/// The default, [`PerPlaneMinMax`], stretches each plane independently.
/// Successive planes of one stack therefore do not share a common scale;
/// a whole-stack policy can be substituted without touching the per-type
/// conversion rules.
pub trait ScalePolicy {
    /// Given the observed extrema of one plane, return the (low, high)
    /// values mapped to 0 and 65535.
    fn display_range(&self, plane_min: f64, plane_max: f64) -> (f64, f64);
}

/// Stretch every plane to its own min/max.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerPlaneMinMax;

impl ScalePolicy for PerPlaneMinMax {
    fn display_range(&self, plane_min: f64, plane_max: f64) -> (f64, f64) {
        (plane_min, plane_max)
    }
}

/// Scale against a fixed value range, e.g. one computed over a whole
/// stack, ignoring the per-plane extrema.
#[derive(Debug, Clone, Copy)]
pub struct FixedRange {
    pub min: f64,
    pub max: f64,
}

impl ScalePolicy for FixedRange {
    fn display_range(&self, _plane_min: f64, _plane_max: f64) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Convert one raw plane into a display buffer.
///
/// Never fails: unsupported encodings log a diagnostic and return an
/// empty image, as a single undisplayable plane should not end a browsing
/// session.
pub fn normalize_plane(
    plane: &PlaneBuffer,
    width: usize,
    height: usize,
    policy: &dyn ScalePolicy,
) -> DisplayImage {
    match plane {
        PlaneBuffer::U8(v) => gray(v.clone(), width, height, 1),
        PlaneBuffer::U16(v) => gray(cast_slice(v).to_vec(), width, height, 2),
        PlaneBuffer::I8(v) => {
            let shifted: Vec<u8> = v.iter().map(|&s| (s as i16 + 128) as u8).collect();
            gray(shifted, width, height, 1)
        }
        PlaneBuffer::I16(v) => {
            let shifted: Vec<u16> = v.iter().map(|&s| (s as i32 + 32768) as u16).collect();
            gray(cast_slice(&shifted).to_vec(), width, height, 2)
        }
        PlaneBuffer::U32(v) => scale_to_u16(v, width, height, policy),
        PlaneBuffer::I32(v) => scale_to_u16(v, width, height, policy),
        PlaneBuffer::F32(v) => scale_to_u16(v, width, height, policy),
        PlaneBuffer::F64(v) => scale_to_u16(v, width, height, policy),
        PlaneBuffer::Bit(v) => {
            let bytes: Vec<u8> = v.iter().map(|&b| if b { 255 } else { 0 }).collect();
            gray(bytes, width, height, 1)
        }
        PlaneBuffer::ComplexF32(_) | PlaneBuffer::ComplexF64(_) => {
            warn!(
                pixel_type = %plane.pixel_type(),
                "Complex pixel types not supported for display"
            );
            DisplayImage::default()
        }
    }
}

fn gray(data: Vec<u8>, width: usize, height: usize, bytes_per_channel: usize) -> DisplayImage {
    DisplayImage {
        data,
        width,
        height,
        channels: 1,
        bytes_per_channel,
    }
}

fn scale_to_u16<T>(
    samples: &[T],
    width: usize,
    height: usize,
    policy: &dyn ScalePolicy,
) -> DisplayImage
where
    T: Copy + Into<f64>,
{
    if samples.is_empty() {
        return DisplayImage::default();
    }

    let mut min_val = samples[0].into();
    let mut max_val = min_val;
    for &s in &samples[1..] {
        let s: f64 = s.into();
        if s < min_val {
            min_val = s;
        }
        if s > max_val {
            max_val = s;
        }
    }

    let (low, high) = policy.display_range(min_val, max_val);

    let out: Vec<u16> = if high > low {
        let scale = 65535.0 / (high - low);
        samples
            .iter()
            .map(|&s| {
                let scaled = (s.into() - low) * scale;
                scaled.round().clamp(0.0, 65535.0) as u16
            })
            .collect()
    } else {
        // Flat plane: nothing to stretch, avoid a division by zero.
        vec![0; samples.len()]
    };

    gray(cast_slice(&out).to_vec(), width, height, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_u16(image: &DisplayImage) -> Vec<u16> {
        assert_eq!(image.bytes_per_channel, 2);
        image
            .data
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect()
    }

    #[test]
    fn u8_and_u16_are_identity_copies() {
        let image = normalize_plane(
            &PlaneBuffer::U8(vec![0, 7, 255, 128]),
            2,
            2,
            &PerPlaneMinMax,
        );
        assert_eq!(image.data, vec![0, 7, 255, 128]);
        assert_eq!(image.bytes_per_channel, 1);
        assert_eq!(image.channels, 1);

        // A constant u16 plane stays untouched: identity, not normalized.
        let image = normalize_plane(
            &PlaneBuffer::U16(vec![500, 500, 500, 500]),
            2,
            2,
            &PerPlaneMinMax,
        );
        assert_eq!(as_u16(&image), vec![500, 500, 500, 500]);
        assert_eq!(image.data_size(), 2 * 2 * 1 * 2);
    }

    #[test]
    fn signed_samples_shift_to_unsigned_midpoint() {
        let image = normalize_plane(
            &PlaneBuffer::I8(vec![-128, -1, 0, 127]),
            2,
            2,
            &PerPlaneMinMax,
        );
        assert_eq!(image.data, vec![0, 127, 128, 255]);

        let image = normalize_plane(
            &PlaneBuffer::I16(vec![-32768, 0, 32767]),
            3,
            1,
            &PerPlaneMinMax,
        );
        assert_eq!(as_u16(&image), vec![0, 32768, 65535]);
    }

    #[test]
    fn scaling_types_map_extrema_to_full_range() {
        let image = normalize_plane(
            &PlaneBuffer::U32(vec![100, 200, 300]),
            3,
            1,
            &PerPlaneMinMax,
        );
        let out = as_u16(&image);
        assert_eq!(out[0], 0);
        assert_eq!(out[2], 65535);
        assert!(out[1] > 0 && out[1] < 65535);

        let image = normalize_plane(
            &PlaneBuffer::I32(vec![-50, 0, 50]),
            3,
            1,
            &PerPlaneMinMax,
        );
        assert_eq!(as_u16(&image), vec![0, 32768, 65535]);

        let image = normalize_plane(
            &PlaneBuffer::F32(vec![0.25, 0.5, 1.0]),
            3,
            1,
            &PerPlaneMinMax,
        );
        let out = as_u16(&image);
        assert_eq!(out[0], 0);
        assert_eq!(out[2], 65535);

        let image = normalize_plane(
            &PlaneBuffer::F64(vec![-1.0, 1.0]),
            2,
            1,
            &PerPlaneMinMax,
        );
        assert_eq!(as_u16(&image), vec![0, 65535]);
    }

    #[test]
    fn flat_planes_of_scaling_types_come_out_all_zero() {
        // Contrast with the constant u16 plane above: a constant u32 plane
        // goes through the scaling path and collapses to zero.
        let image = normalize_plane(
            &PlaneBuffer::U32(vec![500, 500, 500, 500]),
            2,
            2,
            &PerPlaneMinMax,
        );
        assert_eq!(as_u16(&image), vec![0, 0, 0, 0]);

        let image = normalize_plane(&PlaneBuffer::F64(vec![0.0; 4]), 2, 2, &PerPlaneMinMax);
        assert_eq!(as_u16(&image), vec![0, 0, 0, 0]);
    }

    #[test]
    fn booleans_become_black_and_white() {
        let image = normalize_plane(
            &PlaneBuffer::Bit(vec![false, true, true, false]),
            2,
            2,
            &PerPlaneMinMax,
        );
        assert_eq!(image.data, vec![0, 255, 255, 0]);
    }

    #[test]
    fn complex_planes_degrade_to_empty() {
        let image = normalize_plane(
            &PlaneBuffer::ComplexF32(vec![[1.0, 2.0]]),
            1,
            1,
            &PerPlaneMinMax,
        );
        assert!(image.is_empty());
    }

    #[test]
    fn fixed_range_policy_overrides_plane_extrema() {
        let policy = FixedRange {
            min: 0.0,
            max: 1000.0,
        };
        let image = normalize_plane(&PlaneBuffer::U32(vec![0, 250, 500]), 3, 1, &policy);
        let out = as_u16(&image);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 16384);
        assert_eq!(out[2], 32768);
    }
}
