//! Stroke recording surface with undo/redo.

use crate::raster::{RasterResult, RasterSurface, Rasterizer};
use crate::stroke::{PathSet, Point, Stroke};

/// Default surface width and height in pixels.
pub const DEFAULT_BOARD_SIZE: u32 = 400;

/// The vector model of one drawing surface.
///
/// Strokes are recorded from already-normalized points. Undo moves the last
/// stroke into a redo buffer; starting a new stroke forgets the redo buffer.
#[derive(Debug, Clone)]
pub struct StrokeBoard {
    /// Strokes currently on the board (back to front).
    paths: PathSet,
    /// Strokes removed by undo/clear, most recently removed last.
    redo_stack: Vec<Stroke>,
    /// Whether a gesture is in progress.
    drawing: bool,
    /// Set whenever the board content changed and should be redrawn.
    needs_redraw: bool,
    width: u32,
    height: u32,
}

impl Default for StrokeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE, DEFAULT_BOARD_SIZE)
    }
}

impl StrokeBoard {
    /// Create an empty board with the given surface size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            paths: PathSet::new(),
            redo_stack: Vec::new(),
            drawing: false,
            needs_redraw: true,
            width,
            height,
        }
    }

    /// Start a new stroke at `point`.
    pub fn begin_stroke(&mut self, point: Point) {
        self.paths.push(Stroke::new(point));
        self.drawing = true;
        self.redo_stack.clear();
    }

    /// Append `point` to the stroke in progress.
    ///
    /// Ignored when no stroke is in progress.
    pub fn extend_stroke(&mut self, point: Point) {
        if !self.drawing {
            return;
        }
        if let Some(stroke) = self.paths.last_mut() {
            stroke.add_point(point);
            self.needs_redraw = true;
        }
    }

    /// Finish the stroke in progress.
    pub fn end_stroke(&mut self) {
        self.drawing = false;
        self.needs_redraw = true;
    }

    /// Undo the last stroke.
    /// Returns true if a stroke was removed.
    pub fn undo(&mut self) -> bool {
        let undone = match self.paths.pop() {
            Some(stroke) => {
                self.redo_stack.push(stroke);
                true
            }
            None => false,
        };
        self.end_stroke();
        undone
    }

    /// Restore the most recently undone stroke.
    /// Returns true if a stroke was restored.
    pub fn redo(&mut self) -> bool {
        let redone = match self.redo_stack.pop() {
            Some(stroke) => {
                self.paths.push(stroke);
                true
            }
            None => false,
        };
        self.end_stroke();
        redone
    }

    /// Remove every stroke, keeping them available to redo.
    ///
    /// Repeated `redo` brings the strokes back in their original order.
    pub fn clear(&mut self) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        while let Some(stroke) = self.paths.pop() {
            self.redo_stack.push(stroke);
        }
        self.drawing = false;
        self.needs_redraw = true;
        true
    }

    /// Replace the board content with a copy of `paths`.
    ///
    /// Forgets the redo buffer and any stroke in progress.
    pub fn reset(&mut self, paths: &PathSet) {
        self.paths = paths.clone();
        self.redo_stack.clear();
        self.drawing = false;
        self.needs_redraw = true;
    }

    /// Clear the board without keeping anything to redo.
    pub fn reset_empty(&mut self) {
        self.reset(&PathSet::new());
    }

    /// Check if the board has no strokes.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Strokes currently on the board.
    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    /// Strokes available to redo, most recently removed last.
    pub fn redo_stack(&self) -> &[Stroke] {
        &self.redo_stack
    }

    /// Check if a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn can_undo(&self) -> bool {
        !self.paths.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn can_clear(&self) -> bool {
        !self.paths.is_empty()
    }

    /// Whether there is anything worth exporting as an image.
    pub fn can_export_image(&self) -> bool {
        !self.paths.is_empty()
    }

    /// Returns whether a redraw was requested since the last call, and
    /// resets the request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rasterize the current strokes at the board's size.
    pub fn render<R: Rasterizer + ?Sized>(&self, rasterizer: &mut R) -> RasterResult<RasterSurface> {
        rasterizer.render(&self.paths, self.width, self.height)
    }
}
