//! Decoded video frames — channel order handling and downscaling.

use thiserror::Error;

const CHANNELS: usize = 3;

/// Interleaved channel layout of a frame's pixel data.
///
/// CCTV decode pipelines conventionally deliver BGR; the detection and
/// embedding models expect RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Bgr,
    Rgb,
}

/// A decoded video frame: interleaved 8-bit, 3-channel pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Interleaved pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub order: ChannelOrder,
}

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl Frame {
    /// Build a frame from RGB-ordered pixel data.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        Self::new(data, width, height, ChannelOrder::Rgb)
    }

    /// Build a frame from BGR-ordered pixel data.
    pub fn from_bgr(data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        Self::new(data, width, height, ChannelOrder::Bgr)
    }

    fn new(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            order,
        })
    }

    /// Number of bytes a well-formed frame of these dimensions holds.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }

    /// Convert to RGB channel order. No-op when already RGB.
    pub fn into_rgb(mut self) -> Frame {
        if self.order == ChannelOrder::Bgr {
            for px in self.data.chunks_exact_mut(CHANNELS) {
                px.swap(0, 2);
            }
            self.order = ChannelOrder::Rgb;
        }
        self
    }

    /// Downscale by `factor` using bilinear interpolation, preserving
    /// the channel order. Factors outside (0, 1) return the frame
    /// unchanged.
    pub fn downscale(&self, factor: f32) -> Frame {
        if !(factor > 0.0 && factor < 1.0) {
            return self.clone();
        }
        let new_w = ((self.width as f32 * factor).round() as u32).max(1);
        let new_h = ((self.height as f32 * factor).round() as u32).max(1);
        let data = resize_bilinear(
            &self.data,
            self.width as usize,
            self.height as usize,
            new_w as usize,
            new_h as usize,
        );
        Frame {
            data,
            width: new_w,
            height: new_h,
            order: self.order,
        }
    }
}

/// Bilinear resize of interleaved 3-channel pixel data.
///
/// Samples at pixel centers for sub-pixel accuracy; used both for frame
/// downscaling and for the detector's letterbox resize.
pub fn resize_bilinear(
    data: &[u8],
    width: usize,
    height: usize,
    new_w: usize,
    new_h: usize,
) -> Vec<u8> {
    let x_ratio = width as f32 / new_w as f32;
    let y_ratio = height as f32 / new_h as f32;

    let mut out = vec![0u8; new_w * new_h * CHANNELS];

    for y in 0..new_h {
        let src_y = (y as f32 + 0.5) * y_ratio - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, height as i32 - 1) as usize;
        let y1 = (y0 + 1).min(height - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..new_w {
            let src_x = (x as f32 + 0.5) * x_ratio - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, width as i32 - 1) as usize;
            let x1 = (x0 + 1).min(width - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            for c in 0..CHANNELS {
                let tl = data[(y0 * width + x0) * CHANNELS + c] as f32;
                let tr = data[(y0 * width + x1) * CHANNELS + c] as f32;
                let bl = data[(y1 * width + x0) * CHANNELS + c] as f32;
                let br = data[(y1 * width + x1) * CHANNELS + c] as f32;

                let val = tl * (1.0 - fx) * (1.0 - fy)
                    + tr * fx * (1.0 - fy)
                    + bl * (1.0 - fx) * fy
                    + br * fx * fy;

                out[(y * new_w + x) * CHANNELS + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, px: [u8; 3], order: ChannelOrder) -> Frame {
        let data: Vec<u8> = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Frame {
            data,
            width,
            height,
            order,
        }
    }

    #[test]
    fn test_from_rgb_rejects_short_buffer() {
        let result = Frame::from_rgb(vec![0u8; 10], 2, 2);
        assert!(matches!(
            result,
            Err(FrameError::InvalidLength {
                expected: 12,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_into_rgb_swaps_bgr_channels() {
        let frame = Frame::from_bgr(vec![10, 20, 30, 40, 50, 60], 2, 1).unwrap();
        let rgb = frame.into_rgb();
        assert_eq!(rgb.order, ChannelOrder::Rgb);
        assert_eq!(rgb.data, vec![30, 20, 10, 60, 50, 40]);
    }

    #[test]
    fn test_into_rgb_noop_for_rgb() {
        let frame = Frame::from_rgb(vec![10, 20, 30], 1, 1).unwrap();
        let rgb = frame.into_rgb();
        assert_eq!(rgb.data, vec![10, 20, 30]);
    }

    #[test]
    fn test_downscale_dimensions() {
        let frame = solid_frame(100, 80, [128, 128, 128], ChannelOrder::Rgb);
        let small = frame.downscale(0.25);
        assert_eq!((small.width, small.height), (25, 20));
        assert_eq!(small.data.len(), 25 * 20 * 3);
        assert_eq!(small.order, ChannelOrder::Rgb);
    }

    #[test]
    fn test_downscale_uniform_stays_uniform() {
        let frame = solid_frame(64, 64, [7, 99, 201], ChannelOrder::Bgr);
        let small = frame.downscale(0.5);
        for px in small.data.chunks_exact(3) {
            assert_eq!(px, [7, 99, 201]);
        }
    }

    #[test]
    fn test_downscale_factor_one_is_identity() {
        let frame = solid_frame(8, 8, [1, 2, 3], ChannelOrder::Rgb);
        let same = frame.downscale(1.0);
        assert_eq!((same.width, same.height), (8, 8));
        assert_eq!(same.data, frame.data);
    }

    #[test]
    fn test_downscale_invalid_factor_is_identity() {
        let frame = solid_frame(8, 8, [1, 2, 3], ChannelOrder::Rgb);
        assert_eq!(frame.downscale(0.0).width, 8);
        assert_eq!(frame.downscale(-0.5).width, 8);
        assert_eq!(frame.downscale(2.0).width, 8);
    }

    #[test]
    fn test_downscale_never_collapses_to_zero() {
        let frame = solid_frame(4, 4, [9, 9, 9], ChannelOrder::Rgb);
        let tiny = frame.downscale(0.01);
        assert_eq!((tiny.width, tiny.height), (1, 1));
    }

    #[test]
    fn test_resize_bilinear_preserves_channels() {
        // Red-only image stays red-only through resizing.
        let mut data = vec![0u8; 10 * 10 * 3];
        for px in data.chunks_exact_mut(3) {
            px[0] = 200;
        }
        let out = resize_bilinear(&data, 10, 10, 5, 5);
        for px in out.chunks_exact(3) {
            assert_eq!(px, [200, 0, 0]);
        }
    }
}
