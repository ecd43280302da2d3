//! Average luminance of a downscaled frame, used to gate guidance on light level.

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrightnessError {
    #[error("frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("unsupported channel count {0}, expected 3 (RGB) or 4 (RGBA)")]
    UnsupportedChannels(u8),
    #[error("sample scale must be in (0, 1], got {0}")]
    InvalidScale(f64),
}

/// Rec. 601 luma.
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Mean luma over a nearest-neighbour downsample of `frame`.
///
/// The sample grid is `floor(width * scale) x floor(height * scale)`; when
/// that grid is empty the estimate is 0.
pub fn estimate_brightness(frame: &Frame, scale_factor: f64) -> Result<f64, BrightnessError> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 || scale_factor > 1.0 {
        return Err(BrightnessError::InvalidScale(scale_factor));
    }
    if frame.is_empty() {
        return Err(BrightnessError::EmptyFrame {
            width: frame.width(),
            height: frame.height(),
        });
    }
    if !matches!(frame.channels(), 3 | 4) {
        return Err(BrightnessError::UnsupportedChannels(frame.channels()));
    }

    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let sample_w = (width as f64 * scale_factor).floor() as usize;
    let sample_h = (height as f64 * scale_factor).floor() as usize;
    if sample_w == 0 || sample_h == 0 {
        return Ok(0.0);
    }

    let step_x = width as f64 / sample_w as f64;
    let step_y = height as f64 / sample_h as f64;
    let pixels = frame.as_ndarray();

    let mut total = 0.0;
    for row in 0..sample_h {
        let src_y = (((row as f64 + 0.5) * step_y) as usize).min(height - 1);
        for col in 0..sample_w {
            let src_x = (((col as f64 + 0.5) * step_x) as usize).min(width - 1);
            total += luma(
                pixels[[src_y, src_x, 0]],
                pixels[[src_y, src_x, 1]],
                pixels[[src_y, src_x, 2]],
            );
        }
    }

    Ok(total / (sample_w * sample_h) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Frame::new(data, width, height, 3, 0)
    }

    #[rstest]
    #[case::black([0, 0, 0], 0.0)]
    #[case::white([255, 255, 255], 255.0)]
    #[case::red([255, 0, 0], 0.299 * 255.0)]
    #[case::green([0, 255, 0], 0.587 * 255.0)]
    #[case::blue([0, 0, 255], 0.114 * 255.0)]
    fn test_solid_colors(#[case] rgb: [u8; 3], #[case] expected: f64) {
        let frame = solid(100, 50, rgb);
        assert_relative_eq!(estimate_brightness(&frame, 0.1).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_half_dark_half_bright() {
        // Left half black, right half white
        let (w, h) = (40u32, 20u32);
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..h {
            for col in 0..w {
                let v = if col < w / 2 { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let frame = Frame::new(data, w, h, 3, 0);
        assert_relative_eq!(estimate_brightness(&frame, 0.5).unwrap(), 127.5, epsilon = 1e-9);
        assert_relative_eq!(estimate_brightness(&frame, 1.0).unwrap(), 127.5, epsilon = 1e-9);
    }

    #[test]
    fn test_rgba_ignores_alpha() {
        let data = [10u8, 20, 30, 0].repeat(16);
        let frame = Frame::new(data, 4, 4, 4, 0);
        assert_relative_eq!(
            estimate_brightness(&frame, 1.0).unwrap(),
            luma(10, 20, 30),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_sample_grid_collapses_to_zero() {
        // 5x5 at 0.1 → 0x0 samples
        let frame = solid(5, 5, [200, 200, 200]);
        assert_relative_eq!(estimate_brightness(&frame, 0.1).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_frame_fails() {
        let frame = Frame::new(Vec::new(), 0, 0, 3, 0);
        assert_eq!(
            estimate_brightness(&frame, 0.1),
            Err(BrightnessError::EmptyFrame {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn test_grayscale_frame_fails() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        assert_eq!(
            estimate_brightness(&frame, 1.0),
            Err(BrightnessError::UnsupportedChannels(1))
        );
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    #[case::above_one(2.0)]
    #[case::nan(f64::NAN)]
    fn test_invalid_scale(#[case] scale: f64) {
        let frame = solid(10, 10, [0, 0, 0]);
        assert!(matches!(
            estimate_brightness(&frame, scale),
            Err(BrightnessError::InvalidScale(_))
        ));
    }
}
