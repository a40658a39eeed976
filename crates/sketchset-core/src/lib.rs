//! SketchSet Core Library
//!
//! Stroke capture with undo/redo, and the wizard that walks a contributor
//! through a list of labels while keeping every drawing in a session record.

pub mod board;
pub mod labels;
pub mod raster;
pub mod session;
pub mod storage;
pub mod stroke;
pub mod username;
pub mod wizard;

pub use board::{DEFAULT_BOARD_SIZE, StrokeBoard};
pub use labels::{CachedLabels, DEFAULT_LABELS, FileLabels, LabelError, LabelProvider, StaticLabels};
pub use raster::{Background, RasterError, RasterResult, RasterSurface, Rasterizer};
pub use session::{Drawings, SessionId, SessionRecord};
pub use storage::{FileStorage, MemoryStorage, SessionStore, StorageError, StorageResult};
pub use stroke::{PathSet, Point, Stroke};
pub use username::{MAX_USERNAME_LEN, UsernameError, validate_username};
pub use wizard::{
    AdvanceButton, CaptureWizard, Controls, InitError, PreviousButton, WizardAction, WizardError,
    WizardState,
};
