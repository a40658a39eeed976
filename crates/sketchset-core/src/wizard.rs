//! Guided capture wizard.
//!
//! Steps a contributor through a fixed list of labels. Each label's drawing
//! is stored in the session record when the contributor moves on, and put
//! back on the board whenever they return to it.
//!
//! ```text
//! AwaitingName --start--> Drawing <--advance/go_back--> Drawing
//!                            |  ^
//!                    advance |  | go_back
//!                            v  |
//!                          Finished --save--> Saved
//! ```

use crate::board::StrokeBoard;
use crate::labels::{LabelError, LabelProvider};
use crate::session::{SessionId, SessionRecord};
use crate::username::{UsernameError, validate_username};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Where the contributor is in the capture flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardState {
    /// Waiting for a valid contributor name.
    AwaitingName,
    /// Drawing the current label.
    Drawing,
    /// Every label has a drawing; the record can be saved.
    Finished,
    /// The record has been handed out for export. Terminal.
    Saved,
}

impl WizardState {
    pub fn name(self) -> &'static str {
        match self {
            WizardState::AwaitingName => "awaiting name",
            WizardState::Drawing => "drawing",
            WizardState::Finished => "finished",
            WizardState::Saved => "saved",
        }
    }
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A wizard transition, used to report transitions refused by state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardAction {
    Start,
    Advance,
    GoBack,
    Save,
}

impl WizardAction {
    pub fn name(self) -> &'static str {
        match self {
            WizardAction::Start => "start",
            WizardAction::Advance => "advance",
            WizardAction::GoBack => "go back",
            WizardAction::Save => "save",
        }
    }
}

impl fmt::Display for WizardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Refused wizard transitions. The wizard is unchanged after any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error(transparent)]
    InvalidUsername(#[from] UsernameError),
    #[error("Draw something first.")]
    NothingDrawn,
    #[error("There is no previous label to go back to.")]
    NoHistory,
    /// The caller asked for a transition the current state does not allow.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: WizardAction,
        state: WizardState,
    },
}

/// Failure to set up a capture session.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Labels(#[from] LabelError),
    #[error("The label list is empty")]
    NoLabels,
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),
}

/// Caption of the main button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceButton {
    Start,
    Next,
    Save,
}

/// Caption of the backward button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousButton {
    Previous,
    GoBack,
}

/// What the UI should show for the current wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    /// Main button, if any.
    pub advance: Option<AdvanceButton>,
    /// Backward button, if visible.
    pub previous: Option<PreviousButton>,
    /// Whether the backward button can be pressed.
    pub previous_enabled: bool,
    pub show_name_field: bool,
    pub show_board: bool,
    /// Instruction text for the contributor.
    pub prompt: Option<String>,
}

/// Drives one contributor through the label list.
#[derive(Debug)]
pub struct CaptureWizard {
    labels: Vec<String>,
    /// Index of the label being drawn; `labels.len()` once finished.
    current_index: usize,
    /// Labels left behind by `advance`, most recent last.
    history: Vec<String>,
    record: SessionRecord,
    board: StrokeBoard,
    state: WizardState,
}

impl CaptureWizard {
    /// Create a wizard over a resolved label list.
    ///
    /// Labels must be non-empty and unique, since drawings are keyed by label.
    pub fn new(
        labels: Vec<String>,
        board: StrokeBoard,
        session: SessionId,
    ) -> Result<Self, InitError> {
        if labels.is_empty() {
            return Err(InitError::NoLabels);
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(InitError::DuplicateLabel(label.clone()));
            }
        }

        Ok(Self {
            labels,
            current_index: 0,
            history: Vec::new(),
            record: SessionRecord::new(session),
            board,
            state: WizardState::AwaitingName,
        })
    }

    /// Fetch labels from `provider`, then create the wizard.
    ///
    /// A fetch failure is final for this session; there is no retry.
    pub async fn initialize<P: LabelProvider + ?Sized>(
        provider: &P,
        board: StrokeBoard,
        session: SessionId,
    ) -> Result<Self, InitError> {
        let labels = provider.fetch_labels().await.inspect_err(|e| {
            log::error!("Label retrieval failed: {}", e);
        })?;
        log::info!("Loaded {} labels for session {}", labels.len(), session);
        Self::new(labels, board, session)
    }

    /// Accept the contributor's name and show the first label.
    pub fn start(&mut self, username: &str) -> Result<(), WizardError> {
        self.expect_state(WizardAction::Start, &[WizardState::AwaitingName])?;

        let username = validate_username(username)?;
        log::info!("Session {} started by {}", self.record.session, username);

        self.record.username = username;
        self.current_index = 0;
        self.state = WizardState::Drawing;
        self.restore_current();
        Ok(())
    }

    /// Keep the current drawing and move to the next label.
    ///
    /// Refused while the board is empty.
    pub fn advance(&mut self) -> Result<(), WizardError> {
        self.expect_state(WizardAction::Advance, &[WizardState::Drawing])?;

        if self.board.is_empty() {
            return Err(WizardError::NothingDrawn);
        }

        let label = self.labels[self.current_index].clone();
        self.record
            .drawings
            .insert(label.clone(), self.board.paths().clone());
        self.history.push(label);
        self.current_index += 1;

        if self.current_index < self.labels.len() {
            log::debug!(
                "Advanced to label {} ({}/{})",
                self.labels[self.current_index],
                self.current_index + 1,
                self.labels.len()
            );
            self.restore_current();
        } else {
            log::info!("All {} labels drawn", self.labels.len());
            self.board.reset_empty();
            self.state = WizardState::Finished;
        }
        Ok(())
    }

    /// Keep the current drawing and return to the previous label.
    ///
    /// Unlike [`advance`](Self::advance) this also keeps an empty drawing.
    /// From `Finished` nothing is stored, since no label is current.
    pub fn go_back(&mut self) -> Result<(), WizardError> {
        self.expect_state(
            WizardAction::GoBack,
            &[WizardState::Drawing, WizardState::Finished],
        )?;

        if self.history.is_empty() {
            return Err(WizardError::NoHistory);
        }

        if self.state == WizardState::Drawing {
            let label = self.labels[self.current_index].clone();
            self.record
                .drawings
                .insert(label, self.board.paths().clone());
        }

        let Some(previous) = self.history.pop() else {
            return Err(WizardError::NoHistory);
        };
        self.current_index -= 1;
        debug_assert_eq!(self.labels[self.current_index], previous);
        log::debug!("Went back to label {}", previous);

        self.state = WizardState::Drawing;
        self.restore_current();
        Ok(())
    }

    /// Hand out the finished record for export.
    pub fn save(&mut self) -> Result<SessionRecord, WizardError> {
        self.expect_state(WizardAction::Save, &[WizardState::Finished])?;

        self.state = WizardState::Saved;
        log::info!(
            "Session {} saved with {} drawings",
            self.record.session,
            self.record.drawings.len()
        );
        Ok(self.record.clone())
    }

    /// Current state.
    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Index of the current label (`labels().len()` once finished).
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The label being drawn, if any.
    pub fn current_label(&self) -> Option<&str> {
        match self.state {
            WizardState::Drawing => self.labels.get(self.current_index).map(String::as_str),
            _ => None,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels that can be returned to, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The session record as it stands.
    pub fn session(&self) -> &SessionRecord {
        &self.record
    }

    pub fn board(&self) -> &StrokeBoard {
        &self.board
    }

    /// Mutable access to the board, for recording strokes.
    pub fn board_mut(&mut self) -> &mut StrokeBoard {
        &mut self.board
    }

    /// Image file name for the current label.
    pub fn image_file_name(&self) -> Option<String> {
        self.current_label()
            .map(|label| self.record.image_file_name(label))
    }

    /// What the UI should show right now.
    pub fn controls(&self) -> Controls {
        match self.state {
            WizardState::AwaitingName => Controls {
                advance: Some(AdvanceButton::Start),
                previous: None,
                previous_enabled: false,
                show_name_field: true,
                show_board: false,
                prompt: None,
            },
            WizardState::Drawing => Controls {
                advance: Some(AdvanceButton::Next),
                previous: Some(PreviousButton::Previous),
                previous_enabled: !self.history.is_empty(),
                show_name_field: false,
                show_board: true,
                prompt: self
                    .current_label()
                    .map(|label| format!("Please draw a {}. ", label)),
            },
            WizardState::Finished => Controls {
                advance: Some(AdvanceButton::Save),
                previous: Some(PreviousButton::GoBack),
                previous_enabled: !self.history.is_empty(),
                show_name_field: false,
                show_board: false,
                prompt: Some("Thank you. ".to_string()),
            },
            WizardState::Saved => Controls {
                advance: None,
                previous: None,
                previous_enabled: false,
                show_name_field: false,
                show_board: false,
                prompt: Some("File downloaded. ".to_string()),
            },
        }
    }

    fn expect_state(
        &self,
        action: WizardAction,
        allowed: &[WizardState],
    ) -> Result<(), WizardError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            log::warn!("Refused to {} while {}", action, self.state);
            Err(WizardError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    /// Put the current label's saved drawing on the board, or clear it.
    fn restore_current(&mut self) {
        let label = &self.labels[self.current_index];
        match self.record.drawings.get(label) {
            Some(paths) => self.board.reset(paths),
            None => self.board.reset_empty(),
        }
    }
}
