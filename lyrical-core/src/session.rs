//! Beat-marking state machine.
//!
//! A [`Session`] is the lyric lines being edited plus the current
//! [`SyncStatus`]. [`Session::apply`] is a pure transition: it never mutates
//! the session it is called on, and returns the next session together with
//! the [`TransportCommand`]s the caller should execute. A rejected action
//! returns an error and leaves the caller holding the unchanged session.

use crate::error::{CoreError, Result};
use crate::lrc::{self, LyricLine};
use crate::transport::TransportCommand;
use tracing::debug;
use uuid::Uuid;

const LOG_TARGET: &str = "lyrical::session";

/// Where the session is in the marking workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Editing, not marking
    #[default]
    Idle,
    /// Marking; the next mark timestamps `lines[cursor]`
    Syncing { cursor: usize },
    /// Every line was marked or the audio ended
    Completed,
}

impl SyncStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing { .. } => "syncing",
            Self::Completed => "completed",
        }
    }

    /// Index of the line the next mark will timestamp
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        match self {
            Self::Syncing { cursor } => Some(*cursor),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing { .. })
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// Clear every timestamp and mark from the top of the track
    StartFull,
    /// Keep lines up to and including `index`, re-mark everything after it
    StartFromIndex(usize),
    /// A beat was marked at the transport's current position
    Mark { position: f64 },
    /// Stop marking and return to editing
    CancelSync,
    /// Redirect the next mark to another line
    FocusLine(usize),
    EditText { id: Uuid, text: String },
    /// Add an empty untimed line at the end
    AppendLine,
    /// Replace all lines with plain text, one untimed line per non-blank row
    ImportText(String),
    /// The transport reached the end of the media
    ReachEndOfAudio,
}

impl SyncAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StartFull => "start_full",
            Self::StartFromIndex(_) => "start_from_index",
            Self::Mark { .. } => "mark",
            Self::CancelSync => "cancel_sync",
            Self::FocusLine(_) => "focus_line",
            Self::EditText { .. } => "edit_text",
            Self::AppendLine => "append_line",
            Self::ImportText(_) => "import_text",
            Self::ReachEndOfAudio => "reach_end_of_audio",
        }
    }
}

/// The result of a successful transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    /// Transport side effects, in execution order
    pub commands: Vec<TransportCommand>,
}

impl Transition {
    const fn quiet(session: Session) -> Self {
        Self {
            session,
            commands: Vec::new(),
        }
    }
}

/// Lyric lines under edit and the marking status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    lines: Vec<LyricLine>,
    status: SyncStatus,
}

impl Session {
    /// Create an empty idle session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle session over existing lines, in the given order
    #[must_use]
    pub const fn from_lines(lines: Vec<LyricLine>) -> Self {
        Self {
            lines,
            status: SyncStatus::Idle,
        }
    }

    /// Create an idle session from LRC text
    #[must_use]
    pub fn from_lrc(input: &str) -> Self {
        Self::from_lines(lrc::parse(input))
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[must_use]
    pub const fn status(&self) -> SyncStatus {
        self.status
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line the next mark will timestamp, while syncing
    #[must_use]
    pub fn pending_line(&self) -> Option<&LyricLine> {
        self.status.cursor().and_then(|cursor| self.lines.get(cursor))
    }

    /// Number of lines that carry a timestamp
    #[must_use]
    pub fn timed_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_timed()).count()
    }

    /// The session serialized as LRC text
    #[must_use]
    pub fn lrc(&self) -> String {
        lrc::serialize(&self.lines)
    }

    /// The line to highlight in the editor: the cursor while syncing,
    /// otherwise the line playing at `position`.
    #[must_use]
    pub fn active_index(&self, position: f64) -> Option<usize> {
        match self.status {
            SyncStatus::Syncing { cursor } => (cursor < self.lines.len()).then_some(cursor),
            SyncStatus::Idle | SyncStatus::Completed => {
                lrc::current_line_index(&self.lines, position)
            }
        }
    }

    /// Compute the session that follows `action`.
    ///
    /// # Errors
    ///
    /// Returns an error when the action is not valid in the current status
    /// ([`CoreError::InvalidTransition`]) or cannot be carried out on the
    /// current lines, e.g. [`CoreError::NoMoreLines`] when asked to restart
    /// after the last line.
    pub fn apply(&self, action: SyncAction) -> Result<Transition> {
        let name = action.as_str();
        let result = match action {
            SyncAction::StartFull => self.start_full(),
            SyncAction::StartFromIndex(index) => self.start_from_index(index),
            SyncAction::Mark { position } => self.mark(position),
            SyncAction::CancelSync => self.cancel(),
            SyncAction::FocusLine(index) => self.focus(index),
            SyncAction::EditText { id, text } => self.edit_text(id, text),
            SyncAction::AppendLine => Ok(self.append_line()),
            SyncAction::ImportText(raw) => Self::import_text(&raw),
            SyncAction::ReachEndOfAudio => self.reach_end(),
        };

        if let Err(ref e) = result {
            debug!(target: LOG_TARGET, "Rejected {} while {}: {}", name, self.status, e);
        }
        result
    }

    fn start_full(&self) -> Result<Transition> {
        if self.status.is_syncing() {
            return Err(self.invalid("start_full"));
        }
        if self.lines.is_empty() {
            return Err(CoreError::NoLines);
        }

        let lines = self
            .lines
            .iter()
            .map(|line| LyricLine {
                time: None,
                ..line.clone()
            })
            .collect();

        Ok(Transition {
            session: Self {
                lines,
                status: SyncStatus::Syncing { cursor: 0 },
            },
            commands: vec![TransportCommand::Seek(0.0), TransportCommand::Play],
        })
    }

    fn start_from_index(&self, index: usize) -> Result<Transition> {
        if self.lines.is_empty() {
            return Err(CoreError::NoLines);
        }
        let next = index.saturating_add(1);
        let Some(anchor) = self.lines.get(index).filter(|_| next < self.lines.len()) else {
            return Err(CoreError::NoMoreLines { index });
        };

        let mut commands = Vec::with_capacity(2);
        if let Some(time) = anchor.time {
            commands.push(TransportCommand::Seek(time));
        }
        commands.push(TransportCommand::Play);

        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if i >= next {
                    LyricLine {
                        time: None,
                        ..line.clone()
                    }
                } else {
                    line.clone()
                }
            })
            .collect();

        Ok(Transition {
            session: Self {
                lines,
                status: SyncStatus::Syncing { cursor: next },
            },
            commands,
        })
    }

    fn mark(&self, position: f64) -> Result<Transition> {
        let SyncStatus::Syncing { cursor } = self.status else {
            return Err(self.invalid("mark"));
        };
        if cursor >= self.lines.len() {
            return Ok(Transition::quiet(self.clone()));
        }

        let mut lines = self.lines.clone();
        lines[cursor].time = Some(position.max(0.0));

        let next = cursor + 1;
        if next >= lines.len() {
            return Ok(Transition {
                session: Self {
                    lines,
                    status: SyncStatus::Completed,
                },
                commands: vec![TransportCommand::Pause],
            });
        }

        Ok(Transition::quiet(Self {
            lines,
            status: SyncStatus::Syncing { cursor: next },
        }))
    }

    fn cancel(&self) -> Result<Transition> {
        match self.status {
            SyncStatus::Syncing { .. } | SyncStatus::Completed => Ok(Transition::quiet(Self {
                lines: self.lines.clone(),
                status: SyncStatus::Idle,
            })),
            SyncStatus::Idle => Err(self.invalid("cancel_sync")),
        }
    }

    fn focus(&self, index: usize) -> Result<Transition> {
        if !self.status.is_syncing() {
            return Err(self.invalid("focus_line"));
        }
        if index >= self.lines.len() {
            return Err(CoreError::LineOutOfRange {
                index,
                len: self.lines.len(),
            });
        }

        Ok(Transition::quiet(Self {
            lines: self.lines.clone(),
            status: SyncStatus::Syncing { cursor: index },
        }))
    }

    fn edit_text(&self, id: Uuid, text: String) -> Result<Transition> {
        let position = self
            .lines
            .iter()
            .position(|line| line.id == id)
            .ok_or(CoreError::LineNotFound { id })?;

        let mut lines = self.lines.clone();
        lines[position].text = text;

        Ok(Transition::quiet(Self {
            lines,
            status: self.status,
        }))
    }

    fn append_line(&self) -> Transition {
        let mut lines = self.lines.clone();
        lines.push(LyricLine::untimed(""));

        Transition::quiet(Self {
            lines,
            status: self.status,
        })
    }

    fn import_text(raw: &str) -> Result<Transition> {
        let lines = lrc::parse_plain(raw);
        if lines.is_empty() {
            return Err(CoreError::EmptyImport);
        }
        Ok(Transition::quiet(Self::from_lines(lines)))
    }

    fn reach_end(&self) -> Result<Transition> {
        if !self.status.is_syncing() {
            return Err(self.invalid("reach_end_of_audio"));
        }
        Ok(Transition::quiet(Self {
            lines: self.lines.clone(),
            status: SyncStatus::Completed,
        }))
    }

    const fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            action,
            status: self.status.as_str(),
        }
    }
}
