//! SketchSet Render Library
//!
//! CPU rasterization of captured drawings and PNG export.

mod cpu;
mod export;

pub use cpu::CpuRasterizer;
pub use export::{encode_png, write_png};
