//! PNG encoding of rendered drawings.

use sketchset_core::raster::{RasterError, RasterResult, RasterSurface};
use std::fs;
use std::path::Path;

/// Encode a surface as an RGBA8 PNG.
pub fn encode_png(surface: &RasterSurface) -> RasterResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(|e| {
            log::error!("Failed to write PNG header: {:?}", e);
            RasterError::Encode(e.to_string())
        })?;

        writer.write_image_data(surface.rgba()).map_err(|e| {
            log::error!("Failed to write PNG data: {:?}", e);
            RasterError::Encode(e.to_string())
        })?;
    }

    Ok(png_data)
}

/// Encode a surface and write it to `path`.
pub fn write_png(path: &Path, surface: &RasterSurface) -> RasterResult<()> {
    let png_data = encode_png(surface)?;
    fs::write(path, &png_data).map_err(|e| {
        RasterError::Encode(format!("Failed to write {}: {}", path.display(), e))
    })?;
    log::debug!("Wrote PNG to {} ({} bytes)", path.display(), png_data.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn checkerboard() -> RasterSurface {
        let mut rgba = Vec::new();
        for i in 0..6u8 {
            let v = if i % 2 == 0 { 0 } else { 255 };
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
        RasterSurface::from_rgba(3, 2, rgba).unwrap()
    }

    #[test]
    fn test_encode_png_header() {
        let surface = checkerboard();
        let bytes = encode_png(&surface).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(Cursor::new(bytes));
        let mut reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 3);
        assert_eq!(reader.info().height, 2);

        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf).unwrap();
        assert_eq!(&buf[..frame.buffer_size()], surface.rgba());
    }

    #[test]
    fn test_write_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");

        write_png(&path, &checkerboard()).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 8);
    }

    #[test]
    fn test_write_png_missing_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");

        assert!(matches!(
            write_png(&path, &checkerboard()),
            Err(RasterError::Encode(_))
        ));
    }
}
