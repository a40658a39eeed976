//! Rasterizer abstraction and fixed drawing style.

use crate::stroke::PathSet;
use thiserror::Error;

/// Stroke color (opaque black).
pub const STROKE_COLOR: [u8; 4] = [0, 0, 0, 255];
/// Stroke width in pixels.
pub const STROKE_WIDTH: f64 = 3.0;
/// Radius of the dot drawn for single-point strokes.
pub const DOT_RADIUS: f64 = STROKE_WIDTH / 2.0;
/// Surface background (opaque white).
pub const BACKGROUND_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Rasterization errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for rasterizer operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// A rendered drawing: straight (non-premultiplied) RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl RasterSurface {
    /// Wrap pixel data. The buffer must hold exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> RasterResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RasterError::RenderFailed(format!(
                "pixel buffer is {} bytes, expected {}",
                rgba.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    /// Get the RGBA value at a pixel, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ])
    }
}

/// What lies under the strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Fill the surface with an opaque color first.
    Color([u8; 4]),
    /// Leave untouched pixels fully transparent.
    Transparent,
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(BACKGROUND_COLOR)
    }
}

/// Trait for turning a path set into pixels.
///
/// Implementations must be a pure function of their inputs and draw with the
/// constants in this module.
pub trait Rasterizer {
    fn render_on(
        &mut self,
        paths: &PathSet,
        width: u32,
        height: u32,
        background: Background,
    ) -> RasterResult<RasterSurface>;

    /// Render on the board's white background.
    fn render(&mut self, paths: &PathSet, width: u32, height: u32) -> RasterResult<RasterSurface> {
        self.render_on(paths, width, height, Background::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_checked() {
        assert!(RasterSurface::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            RasterSurface::from_rgba(2, 2, vec![0; 15]),
            Err(RasterError::RenderFailed(_))
        ));
    }

    #[test]
    fn test_pixel_lookup() {
        let mut rgba = vec![0; 2 * 2 * 4];
        rgba[12..16].copy_from_slice(&[1, 2, 3, 4]);
        let surface = RasterSurface::from_rgba(2, 2, rgba).unwrap();

        assert_eq!(surface.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(2, 0), None);
    }

    #[test]
    fn test_default_background_is_board_white() {
        assert_eq!(Background::default(), Background::Color([255, 255, 255, 255]));
    }
}
