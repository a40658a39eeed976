//! CPU rasterizer backed by `vello_cpu`.

use kurbo::Shape as _;
use sketchset_core::raster::{
    Background, DOT_RADIUS, RasterError, RasterResult, RasterSurface, Rasterizer, STROKE_COLOR,
    STROKE_WIDTH,
};
use sketchset_core::stroke::{PathSet, Stroke};
use vello_cpu::peniko::Color;

/// Tolerance used when flattening dot circles into paths.
const CIRCLE_TOLERANCE: f64 = 0.1;

/// Draws path sets the way the capture board shows them: black round-capped
/// 3px lines, taps as filled dots.
#[derive(Debug, Default)]
pub struct CpuRasterizer {
    /// Number of surfaces rendered so far.
    frames: u64,
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces rendered by this rasterizer.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Rasterizer for CpuRasterizer {
    fn render_on(
        &mut self,
        paths: &PathSet,
        width: u32,
        height: u32,
        background: Background,
    ) -> RasterResult<RasterSurface> {
        let invalid = || RasterError::InvalidSize { width, height };
        let w: u16 = width.try_into().map_err(|_| invalid())?;
        let h: u16 = height.try_into().map_err(|_| invalid())?;
        if w == 0 || h == 0 {
            return Err(invalid());
        }

        let mut ctx = vello_cpu::RenderContext::new(w, h);

        if let Background::Color(fill) = background {
            ctx.set_paint(color(fill));
            ctx.fill_rect(&kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
        }

        ctx.set_paint(color(STROKE_COLOR));
        ctx.set_stroke(
            kurbo::Stroke::new(STROKE_WIDTH)
                .with_caps(kurbo::Cap::Round)
                .with_join(kurbo::Join::Round),
        );
        for stroke in paths {
            draw_stroke(&mut ctx, stroke);
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let mut rgba = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_in_place(&mut rgba);

        self.frames += 1;
        log::trace!(
            "Rasterized {} strokes at {}x{}",
            paths.len(),
            width,
            height
        );
        RasterSurface::from_rgba(width, height, rgba)
    }
}

fn draw_stroke(ctx: &mut vello_cpu::RenderContext, stroke: &Stroke) {
    match stroke.as_dot() {
        Some(point) => {
            let dot = kurbo::Circle::new(point.to_kurbo(), DOT_RADIUS);
            ctx.fill_path(&dot.to_path(CIRCLE_TOLERANCE));
        }
        None => ctx.stroke_path(&stroke.to_path()),
    }
}

fn color([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a)
}

/// Convert premultiplied RGBA8 to straight alpha.
fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        if a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}
