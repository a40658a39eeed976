//! Scripted capture sessions.
//!
//! A script is the sequence of UI events a contributor would produce. The
//! runner applies each event only when the UI would allow it, so a script
//! exercises the wizard exactly as the buttons and the board do.

use crate::export::{export_current_image, export_session_images};
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use sketchset_core::board::StrokeBoard;
use sketchset_core::labels::LabelProvider;
use sketchset_core::raster::Rasterizer;
use sketchset_core::session::{SessionId, SessionRecord};
use sketchset_core::storage::SessionStore;
use sketchset_core::stroke::Point;
use sketchset_core::wizard::{AdvanceButton, CaptureWizard, WizardError, WizardState};
use std::fs;
use std::path::{Path, PathBuf};

/// One UI event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UiAction {
    /// Name typed and the start button pressed.
    Start { username: String },
    PointerDown { x: u32, y: u32 },
    PointerMove { x: u32, y: u32 },
    PointerUp,
    Undo,
    Redo,
    Clear,
    Next,
    Previous,
    Save,
    /// Export the current drawing as an image.
    ExportImage,
}

/// A recorded session: an optional fixed id and its events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureScript {
    #[serde(default)]
    pub session: Option<SessionId>,
    pub actions: Vec<UiAction>,
}

impl CaptureScript {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parse script '{}'", path.display()))
    }
}

/// Where a capture run writes its output.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub surface_size: u32,
    /// Directory for exported images; no images are written when unset.
    pub image_dir: Option<PathBuf>,
}

/// Outcome of one scripted session.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub session: SessionId,
    pub state: WizardState,
    /// Events that changed something.
    pub applied: usize,
    /// Events the UI would have blocked or that were rejected.
    pub refused: usize,
    /// Events after which the board needed repainting.
    pub redraws: usize,
    /// The record handed to storage, if the session was saved.
    pub saved: Option<SessionRecord>,
    pub images: Vec<PathBuf>,
}

enum Outcome {
    Applied,
    Refused(String),
}

/// Replays scripts against a wizard, a store and a rasterizer.
pub struct CaptureRunner<'a, R: Rasterizer + ?Sized> {
    store: &'a dyn SessionStore,
    rasterizer: &'a mut R,
    options: CaptureOptions,
}

impl<'a, R: Rasterizer + ?Sized> CaptureRunner<'a, R> {
    pub fn new(store: &'a dyn SessionStore, rasterizer: &'a mut R, options: CaptureOptions) -> Self {
        Self {
            store,
            rasterizer,
            options,
        }
    }

    /// Fetch labels, then replay `script` as one session.
    pub fn run<P: LabelProvider + ?Sized>(
        &mut self,
        labels: &P,
        script: &CaptureScript,
    ) -> anyhow::Result<CaptureReport> {
        let session = script.session.clone().unwrap_or_else(SessionId::generate);
        let board = StrokeBoard::new(self.options.surface_size, self.options.surface_size);
        let mut wizard = pollster::block_on(CaptureWizard::initialize(labels, board, session))
            .context("initialize capture session")?;
        wizard.board_mut().take_redraw();

        let mut report = CaptureReport {
            session: wizard.session().session.clone(),
            state: wizard.state(),
            applied: 0,
            refused: 0,
            redraws: 0,
            saved: None,
            images: Vec::new(),
        };

        for (index, action) in script.actions.iter().enumerate() {
            match self.apply(&mut wizard, action, &mut report)? {
                Outcome::Applied => report.applied += 1,
                Outcome::Refused(reason) => {
                    log::warn!("Action {} ({:?}) refused: {}", index, action, reason);
                    report.refused += 1;
                }
            }
            if wizard.board_mut().take_redraw() {
                report.redraws += 1;
            }
        }

        report.state = wizard.state();
        log::info!(
            "Session {} ended in state {} ({} applied, {} refused)",
            report.session,
            report.state,
            report.applied,
            report.refused
        );
        Ok(report)
    }

    fn apply(
        &mut self,
        wizard: &mut CaptureWizard,
        action: &UiAction,
        report: &mut CaptureReport,
    ) -> anyhow::Result<Outcome> {
        let controls = wizard.controls();
        let board_guard = |allowed: bool, what: &str| {
            if allowed {
                Outcome::Applied
            } else {
                Outcome::Refused(format!("{} is disabled", what))
            }
        };

        let outcome = match action {
            UiAction::Start { username } => {
                if controls.advance != Some(AdvanceButton::Start) {
                    return Ok(Outcome::Refused("start button is hidden".to_string()));
                }
                rejected(wizard.start(username))
            }
            UiAction::PointerDown { x, y } => {
                if !controls.show_board {
                    return Ok(Outcome::Refused("board is hidden".to_string()));
                }
                wizard.board_mut().begin_stroke(Point::new(*x, *y));
                Outcome::Applied
            }
            UiAction::PointerMove { x, y } => {
                let board = wizard.board_mut();
                let drawing = board.is_drawing();
                board.extend_stroke(Point::new(*x, *y));
                board_guard(drawing, "drawing without a pressed pointer")
            }
            UiAction::PointerUp => {
                if !controls.show_board {
                    return Ok(Outcome::Refused("board is hidden".to_string()));
                }
                wizard.board_mut().end_stroke();
                Outcome::Applied
            }
            UiAction::Undo => {
                let board = wizard.board_mut();
                board_guard(board.can_undo() && board.undo(), "undo")
            }
            UiAction::Redo => {
                let board = wizard.board_mut();
                board_guard(board.can_redo() && board.redo(), "redo")
            }
            UiAction::Clear => {
                let board = wizard.board_mut();
                board_guard(board.can_clear() && board.clear(), "clear")
            }
            UiAction::Next => {
                if controls.advance != Some(AdvanceButton::Next) {
                    return Ok(Outcome::Refused("next button is hidden".to_string()));
                }
                rejected(wizard.advance())
            }
            UiAction::Previous => {
                if !controls.previous_enabled {
                    return Ok(Outcome::Refused("previous button is disabled".to_string()));
                }
                rejected(wizard.go_back())
            }
            UiAction::Save => {
                if controls.advance != Some(AdvanceButton::Save) {
                    return Ok(Outcome::Refused("save button is hidden".to_string()));
                }
                let record = wizard.save()?;
                self.persist(&record, report)?;
                report.saved = Some(record);
                Outcome::Applied
            }
            UiAction::ExportImage => {
                let Some(dir) = self.options.image_dir.as_deref() else {
                    return Ok(Outcome::Refused("no image directory".to_string()));
                };
                match export_current_image(wizard, &mut *self.rasterizer, dir)? {
                    Some(path) => {
                        report.images.push(path);
                        Outcome::Applied
                    }
                    None => Outcome::Refused("nothing to export".to_string()),
                }
            }
        };
        Ok(outcome)
    }

    fn persist(&mut self, record: &SessionRecord, report: &mut CaptureReport) -> anyhow::Result<()> {
        pollster::block_on(self.store.save(record))
            .with_context(|| format!("store session {}", record.session))?;

        if let Some(dir) = self.options.image_dir.as_deref() {
            let images =
                export_session_images(record, &mut *self.rasterizer, self.options.surface_size, dir)?;
            report.images.extend(images);
        }
        Ok(())
    }
}

fn rejected(result: Result<(), WizardError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Applied,
        Err(e) => Outcome::Refused(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchset_core::labels::{CachedLabels, StaticLabels};
    use sketchset_core::storage::MemoryStorage;
    use sketchset_render::CpuRasterizer;
    use tempfile::tempdir;

    fn labels() -> StaticLabels {
        StaticLabels::new(["car", "fish"])
    }

    fn options(image_dir: Option<PathBuf>) -> CaptureOptions {
        CaptureOptions {
            surface_size: 32,
            image_dir,
        }
    }

    fn line(from: (u32, u32), to: (u32, u32)) -> Vec<UiAction> {
        vec![
            UiAction::PointerDown { x: from.0, y: from.1 },
            UiAction::PointerMove { x: to.0, y: to.1 },
            UiAction::PointerUp,
        ]
    }

    fn full_session() -> CaptureScript {
        let mut actions = vec![UiAction::Start {
            username: "Jane Doe".to_string(),
        }];
        actions.extend(line((1, 1), (10, 10)));
        actions.push(UiAction::Next);
        actions.extend(line((5, 5), (20, 5)));
        actions.push(UiAction::Next);
        actions.push(UiAction::Save);
        CaptureScript {
            session: Some(SessionId::from(42)),
            actions,
        }
    }

    #[test]
    fn test_script_parses_from_json() {
        let script: CaptureScript = serde_json::from_str(
            r#"{"session": 7, "actions": [
                {"action": "start", "username": "Ann"},
                {"action": "pointer_down", "x": 1, "y": 2},
                {"action": "pointer_up"},
                {"action": "export_image"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(script.session, Some(SessionId::from(7)));
        assert_eq!(script.actions[1], UiAction::PointerDown { x: 1, y: 2 });
        assert_eq!(script.actions[3], UiAction::ExportImage);
    }

    #[test]
    fn test_full_session_is_stored() {
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner = CaptureRunner::new(&store, &mut rasterizer, options(None));

        let report = runner.run(&labels(), &full_session()).unwrap();

        assert_eq!(report.state, WizardState::Saved);
        assert_eq!(report.refused, 0);
        let saved = report.saved.unwrap();
        assert_eq!(saved.username, "Jane Doe");
        assert_eq!(saved.drawings.labels().collect::<Vec<_>>(), vec!["car", "fish"]);

        let stored = pollster::block_on(store.load("42")).unwrap();
        assert_eq!(stored, saved);
    }

    #[test]
    fn test_blocked_actions_are_refused() {
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner = CaptureRunner::new(&store, &mut rasterizer, options(None));

        let script = CaptureScript {
            session: Some(SessionId::from(1)),
            actions: vec![
                UiAction::PointerDown { x: 1, y: 1 },
                UiAction::Next,
                UiAction::Start {
                    username: "R2-D2".to_string(),
                },
                UiAction::Start {
                    username: "Ann".to_string(),
                },
                UiAction::Next,
                UiAction::Previous,
                UiAction::Undo,
                UiAction::Save,
            ],
        };
        let report = runner.run(&labels(), &script).unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.refused, 7);
        assert_eq!(report.state, WizardState::Drawing);
        assert!(report.saved.is_none());
        assert!(pollster::block_on(store.list()).unwrap().is_empty());
    }

    #[test]
    fn test_pointer_up_ignored_while_board_hidden() {
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner = CaptureRunner::new(&store, &mut rasterizer, options(None));

        let mut script = full_session();
        script.actions.insert(0, UiAction::PointerUp);
        script.actions.push(UiAction::PointerUp);
        let report = runner.run(&labels(), &script).unwrap();

        assert_eq!(report.refused, 2);
        assert_eq!(report.state, WizardState::Saved);

        let clean = runner.run(&labels(), &full_session()).unwrap();
        assert_eq!(report.redraws, clean.redraws);
    }

    #[test]
    fn test_undo_redo_clear_through_script() {
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner = CaptureRunner::new(&store, &mut rasterizer, options(None));

        let mut actions = vec![UiAction::Start {
            username: "Ann".to_string(),
        }];
        actions.extend(line((1, 1), (2, 2)));
        actions.extend(line((3, 3), (4, 4)));
        actions.extend([
            UiAction::Undo,
            UiAction::Redo,
            UiAction::Redo,
            UiAction::Clear,
            UiAction::Undo,
            UiAction::Next,
        ]);
        let report = runner
            .run(
                &labels(),
                &CaptureScript {
                    session: Some(SessionId::from(2)),
                    actions,
                },
            )
            .unwrap();

        // Second redo, undo after clear, next on an empty board.
        assert_eq!(report.refused, 3);
        assert_eq!(report.state, WizardState::Drawing);
        // Pointer down alone does not repaint.
        assert_eq!(report.redraws, 8);
    }

    #[test]
    fn test_save_exports_images() {
        let dir = tempdir().unwrap();
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner =
            CaptureRunner::new(&store, &mut rasterizer, options(Some(dir.path().to_path_buf())));

        let report = runner.run(&labels(), &full_session()).unwrap();

        assert_eq!(
            report.images,
            vec![
                dir.path().join("42_Jane Doe_car.png"),
                dir.path().join("42_Jane Doe_fish.png"),
            ]
        );
        assert!(report.images.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_export_current_drawing() {
        let dir = tempdir().unwrap();
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner =
            CaptureRunner::new(&store, &mut rasterizer, options(Some(dir.path().to_path_buf())));

        let mut actions = vec![
            UiAction::Start {
                username: "Ann".to_string(),
            },
            UiAction::ExportImage,
        ];
        actions.extend(line((1, 1), (9, 9)));
        actions.push(UiAction::ExportImage);
        let report = runner
            .run(
                &labels(),
                &CaptureScript {
                    session: Some(SessionId::from(5)),
                    actions,
                },
            )
            .unwrap();

        assert_eq!(report.refused, 1);
        assert_eq!(report.images, vec![dir.path().join("5_Ann_car.png")]);
    }

    #[test]
    fn test_sessions_share_cached_labels() {
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner = CaptureRunner::new(&store, &mut rasterizer, options(None));
        let provider = CachedLabels::new(labels());

        let mut second = full_session();
        second.session = Some(SessionId::from(43));
        runner.run(&provider, &full_session()).unwrap();
        runner.run(&provider, &second).unwrap();

        assert!(provider.is_cached());
        let mut ids = pollster::block_on(store.list()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["42", "43"]);
    }

    #[test]
    fn test_empty_labels_fail_initialization() {
        let store = MemoryStorage::new();
        let mut rasterizer = CpuRasterizer::new();
        let mut runner = CaptureRunner::new(&store, &mut rasterizer, options(None));
        let empty = StaticLabels::new(Vec::<String>::new());

        assert!(runner.run(&empty, &full_session()).is_err());
    }
}
