//! SketchSet command line support: scripted capture sessions, image export
//! for saved sessions and dataset generation.

pub mod capture;
pub mod config;
pub mod dataset;
pub mod export;
pub mod progress;

pub use capture::{CaptureOptions, CaptureReport, CaptureRunner, CaptureScript, UiAction};
pub use config::AppConfig;
pub use dataset::{Sample, generate};
pub use export::{export_current_image, export_session_images};
pub use progress::{Progress, format_percent};
