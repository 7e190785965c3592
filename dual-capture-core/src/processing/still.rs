use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::models::error::CaptureError;

pub const PNG_MIME: &str = "image/png";

/// Lossless PNG encoding of a composited frame.
pub fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(CaptureError::EncodingFailed("cannot encode an empty frame".into()));
    }
    let mut out = Cursor::new(Vec::new());
    frame
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CaptureError::EncodingFailed(format!("png: {}", e)))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_roundtrips_pixels() {
        let frame = RgbaImage::from_pixel(9, 16, Rgba([10, 20, 30, 255]));
        let bytes = encode_png(&frame).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (9, 16));
        assert_eq!(decoded.get_pixel(4, 8), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn empty_frame_is_rejected() {
        assert!(matches!(
            encode_png(&RgbaImage::new(0, 0)),
            Err(CaptureError::EncodingFailed(_))
        ));
    }
}
