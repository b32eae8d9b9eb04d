//! Resolve accumulated radiance sums into displayable images.
//!
//! The framebuffer hands over (sum, sample count) pairs per pixel; this
//! module averages, gamma-corrects, clamps, and writes PPM or PNG output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use lumen_math::Interval;
use thiserror::Error;

use crate::{Color, FrameBuffer};

/// Errors from encoding or writing an image.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unsupported output format '{0}' (expected .png or .ppm)")]
    UnsupportedFormat(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("png encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Displayable channel range. The top stays just below 1.0 so the byte
/// conversion never reaches 256.
const INTENSITY: Interval = Interval { min: 0.0, max: 0.999 };

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Resolve an accumulated sample sum into an 8-bit RGB triple.
pub fn resolve(sum: Color, samples: u32) -> [u8; 3] {
    let scale = 1.0 / samples.max(1) as f32;

    let r = linear_to_gamma(sum.x * scale);
    let g = linear_to_gamma(sum.y * scale);
    let b = linear_to_gamma(sum.z * scale);

    [
        (256.0 * INTENSITY.clamp(r)) as u8,
        (256.0 * INTENSITY.clamp(g)) as u8,
        (256.0 * INTENSITY.clamp(b)) as u8,
    ]
}

/// Resolve a whole framebuffer to packed RGB bytes, row-major, top row first.
pub fn to_rgb_bytes(frame: &FrameBuffer, samples: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((frame.width() * frame.height() * 3) as usize);

    for sum in frame.data().chunks_exact(3) {
        let rgb = resolve(Color::new(sum[0], sum[1], sum[2]), samples);
        bytes.extend_from_slice(&rgb);
    }

    bytes
}

/// Write the framebuffer as plain-text PPM (P3).
pub fn write_ppm(frame: &FrameBuffer, samples: u32, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", frame.width(), frame.height())?;
    writeln!(writer, "255")?;

    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let rgb = resolve(frame.pixel(x, y), samples);
            writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
        }
    }

    Ok(())
}

/// Save the framebuffer as a PPM file.
pub fn save_ppm(frame: &FrameBuffer, samples: u32, path: &Path) -> Result<(), EncodeError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_ppm(frame, samples, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Save the framebuffer as a PNG file.
pub fn save_png(frame: &FrameBuffer, samples: u32, path: &Path) -> Result<(), EncodeError> {
    let bytes = to_rgb_bytes(frame, samples);
    image::save_buffer(
        path,
        &bytes,
        frame.width(),
        frame.height(),
        image::ColorType::Rgb8,
    )?;
    Ok(())
}

/// Save the framebuffer, choosing the format from the file extension.
pub fn save(frame: &FrameBuffer, samples: u32, path: &Path) -> Result<(), EncodeError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => save_png(frame, samples, path),
        Some("ppm") => save_ppm(frame, samples, path),
        other => Err(EncodeError::UnsupportedFormat(
            other.unwrap_or("").to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_resolve_averages_and_gamma_corrects() {
        // Sum of 4 samples each contributing 0.25: average 0.25, gamma 0.5
        let rgb = resolve(Color::new(1.0, 1.0, 1.0), 4);
        assert_eq!(rgb, [128, 128, 128]);
    }

    #[test]
    fn test_resolve_clamps_overbright() {
        let rgb = resolve(Color::new(100.0, 100.0, 100.0), 1);
        assert_eq!(rgb, [255, 255, 255]);
    }

    #[test]
    fn test_resolve_clamps_negative() {
        let rgb = resolve(Color::new(-1.0, -1.0, -1.0), 1);
        assert_eq!(rgb, [0, 0, 0]);
    }

    #[test]
    fn test_ppm_header_and_rows() {
        let mut frame = FrameBuffer::new(2, 2);
        // Top row fully lit, bottom row dark (one sample per pixel)
        frame.write_rows(0, &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        frame.write_rows(1, &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let mut out = Vec::new();
        write_ppm(&frame, 1, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "P3");
        assert_eq!(lines[1], "2 2");
        assert_eq!(lines[2], "255");
        // Top row first
        assert_eq!(lines[3], "255 255 255");
        assert_eq!(lines[4], "255 255 255");
        assert_eq!(lines[5], "0 0 0");
        assert_eq!(lines[6], "0 0 0");
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let frame = FrameBuffer::new(1, 1);
        let err = save(&frame, 1, Path::new("render.bmp")).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedFormat(ext) if ext == "bmp"));
    }
}
