//! The editing surface's side of the sync engine.
//!
//! [`Studio`] owns the current [`Session`], runs every user action through
//! the session reducer, executes the resulting transport commands and
//! broadcasts [`StudioEvent`]s for whatever renders the editor.

use lyrical_core::export::{self, ExportedFile};
use lyrical_core::{
    AudioFile, CoreError, PlaybackState, Result, Session, StudioConfig, SyncAction, SyncStatus,
    TagService, TrackMetadata, Transport, TransportEvent,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

const LOG_TARGET: &str = "lyrical::studio";

/// Events emitted by the studio
#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    /// The session moved to a new state
    SessionChanged {
        status: SyncStatus,
        lines: usize,
        timed: usize,
    },
    /// A beat mark timestamped a line
    LineMarked { index: usize, time: f64 },
    /// Marking finished, either on the last line or at the end of the audio
    SyncCompleted,
    /// A track was loaded and its metadata read
    TrackLoaded {
        title: String,
        artist: String,
        lines: usize,
    },
    /// A track was loaded but its tags could not be read
    MetadataUnavailable { reason: String },
    Exported { name: String },
    /// Message to show the user in a blocking notice
    Notice { message: String },
}

struct LoadedTrack {
    file: AudioFile,
    metadata: Option<TrackMetadata>,
}

/// Owns the session and drives the transport
pub struct Studio<T: Transport> {
    transport: T,
    session: Session,
    playback: PlaybackState,
    config: StudioConfig,
    track: Option<LoadedTrack>,
    event_tx: broadcast::Sender<StudioEvent>,
}

impl<T: Transport> Studio<T> {
    /// Create a studio with an empty session
    #[must_use]
    pub fn new(mut transport: T, config: StudioConfig) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let playback = PlaybackState::with_volume(config.playback.volume);
        transport.set_volume(playback.volume);

        Self {
            transport,
            session: Session::new(),
            playback,
            config,
            track: None,
            event_tx,
        }
    }

    /// Subscribe to studio events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.event_tx.subscribe()
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Metadata of the loaded track, if it could be read
    #[must_use]
    pub fn metadata(&self) -> Option<&TrackMetadata> {
        self.track.as_ref().and_then(|track| track.metadata.as_ref())
    }

    /// The line the editor should highlight right now
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.session.active_index(self.playback.position)
    }

    /// Apply an action to the session and execute its transport commands.
    ///
    /// Errors that the user should see are also broadcast as
    /// [`StudioEvent::Notice`].
    ///
    /// # Errors
    ///
    /// Returns the reducer's error if the action was rejected; the session is
    /// unchanged in that case.
    pub fn dispatch(&mut self, action: SyncAction) -> Result<()> {
        let marked_index = match action {
            SyncAction::Mark { .. } => self.session.status().cursor(),
            _ => None,
        };

        let transition = match self.session.apply(action) {
            Ok(transition) => transition,
            Err(e) => {
                if e.is_user_notice() {
                    self.emit(StudioEvent::Notice {
                        message: e.to_string(),
                    });
                }
                return Err(e);
            }
        };

        let was_completed = self.session.status() == SyncStatus::Completed;
        self.session = transition.session;

        for command in transition.commands {
            debug!(target: LOG_TARGET, "Transport command: {:?}", command);
            command.execute(&mut self.transport);
        }

        if let Some(index) = marked_index {
            if let Some(time) = self.session.lines().get(index).and_then(|line| line.time) {
                self.emit(StudioEvent::LineMarked { index, time });
            }
        }

        self.emit(StudioEvent::SessionChanged {
            status: self.session.status(),
            lines: self.session.len(),
            timed: self.session.timed_count(),
        });

        if !was_completed && self.session.status() == SyncStatus::Completed {
            info!(
                target: LOG_TARGET,
                "Sync completed: {}/{} lines timed",
                self.session.timed_count(),
                self.session.len()
            );
            self.emit(StudioEvent::SyncCompleted);
        }

        Ok(())
    }

    /// Mark a beat at the transport's current position
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] when not syncing.
    pub fn mark(&mut self) -> Result<()> {
        let position = self.transport.position();
        self.dispatch(SyncAction::Mark { position })
    }

    /// Replace the lyrics with pasted plain text
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyImport`] if the text has no non-blank lines.
    pub fn import_text(&mut self, raw: impl Into<String>) -> Result<()> {
        self.dispatch(SyncAction::ImportText(raw.into()))
    }

    /// Change the text of a line
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LineNotFound`] for an unknown id.
    pub fn edit_text(&mut self, id: Uuid, text: impl Into<String>) -> Result<()> {
        self.dispatch(SyncAction::EditText {
            id,
            text: text.into(),
        })
    }

    /// A line was clicked. Only redirects marking while syncing; otherwise
    /// there is nothing to do.
    pub fn focus_line(&mut self, index: usize) {
        if self.session.status().is_syncing() {
            if let Err(e) = self.dispatch(SyncAction::FocusLine(index)) {
                warn!(target: LOG_TARGET, "Cannot focus line {}: {}", index, e);
            }
        }
    }

    /// Feed a transport signal into the studio
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        self.playback.apply(event);

        if event == TransportEvent::PlaybackEnded && self.session.status().is_syncing() {
            info!(target: LOG_TARGET, "Audio ended before all lines were marked");
            if let Err(e) = self.dispatch(SyncAction::ReachEndOfAudio) {
                warn!(target: LOG_TARGET, "Failed to complete sync at end of audio: {}", e);
            }
        }
    }

    /// Play if paused, pause if playing
    pub fn toggle_playback(&mut self) {
        if self.playback.is_playing {
            self.transport.pause();
        } else {
            self.transport.play();
        }
    }

    /// Move the playhead, e.g. from the scrub bar
    pub fn seek(&mut self, seconds: f64) {
        self.transport.seek(seconds.max(0.0));
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = self.playback.set_volume(volume);
        self.transport.set_volume(volume);
    }

    /// Load an audio file, reading its tags and any embedded lyrics.
    ///
    /// The session goes back to idle. When the file carries lyrics they
    /// replace the session's lines; otherwise the current lines are kept so
    /// pasted text survives loading the audio afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MetadataRead`] if the tags cannot be read. The file
    /// is still loaded, without metadata, and the lyrics remain editable.
    pub async fn load_track(&mut self, service: &dyn TagService, file: AudioFile) -> Result<()> {
        info!(target: LOG_TARGET, "Loading {} ({} bytes)", file.name, file.bytes.len());

        let tags = service.read(&file).await;
        let result = match tags {
            Ok(tags) => {
                let metadata = TrackMetadata::from_tags(&file, tags);
                let lines = metadata.lyric_lines();
                self.session = if lines.is_empty() {
                    Session::from_lines(self.session.lines().to_vec())
                } else {
                    Session::from_lines(lines)
                };

                self.emit(StudioEvent::TrackLoaded {
                    title: metadata.title.clone(),
                    artist: metadata.artist.clone(),
                    lines: self.session.len(),
                });
                self.track = Some(LoadedTrack {
                    file,
                    metadata: Some(metadata),
                });
                Ok(())
            }
            Err(e) => {
                let e = match e {
                    CoreError::MetadataRead { .. } => e,
                    other => CoreError::MetadataRead {
                        reason: other.to_string(),
                    },
                };
                warn!(target: LOG_TARGET, "{}: {}", file.name, e);

                self.session = Session::from_lines(self.session.lines().to_vec());
                self.emit(StudioEvent::MetadataUnavailable {
                    reason: e.to_string(),
                });
                self.emit(StudioEvent::Notice {
                    message: e.to_string(),
                });
                self.track = Some(LoadedTrack {
                    file,
                    metadata: None,
                });
                Err(e)
            }
        };

        self.emit(StudioEvent::SessionChanged {
            status: self.session.status(),
            lines: self.session.len(),
            timed: self.session.timed_count(),
        });

        result
    }

    /// Write the current lyrics and tags into a copy of the loaded file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ExportFailed`] if no track with metadata is
    /// loaded or the tag service fails.
    pub async fn export(&self, service: &dyn TagService) -> Result<ExportedFile> {
        let Some((file, metadata)) = self
            .track
            .as_ref()
            .and_then(|track| track.metadata.as_ref().map(|meta| (&track.file, meta)))
        else {
            let e = CoreError::ExportFailed {
                reason: "no track with metadata is loaded".to_string(),
            };
            self.emit(StudioEvent::Notice {
                message: e.to_string(),
            });
            return Err(e);
        };

        match export::export(
            service,
            file,
            metadata,
            self.session.lines(),
            &self.config.export,
        )
        .await
        {
            Ok(exported) => {
                self.emit(StudioEvent::Exported {
                    name: exported.name.clone(),
                });
                Ok(exported)
            }
            Err(e) => {
                self.emit(StudioEvent::Notice {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn emit(&self, event: StudioEvent) {
        let _ = self.event_tx.send(event);
    }
}
