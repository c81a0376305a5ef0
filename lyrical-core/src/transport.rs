//! Contract with the audio transport that plays the track being synced.
//!
//! The sync engine never talks to the transport directly. It returns
//! [`TransportCommand`]s that the caller executes, and the caller feeds
//! [`TransportEvent`]s back into a [`PlaybackState`] for display.

/// Default playback volume (0.0 to 1.0)
pub const DEFAULT_VOLUME: f64 = 0.8;

/// An audio player the studio drives.
///
/// Positions and durations are in seconds.
pub trait Transport {
    /// Current playback position
    fn position(&self) -> f64;

    /// Total length of the loaded track, zero until known
    fn duration(&self) -> f64;

    fn seek(&mut self, seconds: f64);

    fn play(&mut self);

    fn pause(&mut self);

    fn set_volume(&mut self, volume: f64);
}

/// A side effect requested by the sync engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    Seek(f64),
    Play,
    Pause,
}

impl TransportCommand {
    /// Execute this command against a transport
    pub fn execute<T: Transport + ?Sized>(self, transport: &mut T) {
        match self {
            Self::Seek(seconds) => transport.seek(seconds),
            Self::Play => transport.play(),
            Self::Pause => transport.pause(),
        }
    }
}

/// Signals emitted by the transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Periodic position tick
    PositionChanged { position: f64 },
    /// Track length became known
    MetadataLoaded { duration: f64 },
    PlaybackStarted,
    PlaybackPaused,
    /// End of media reached
    PlaybackEnded,
}

/// Last known transport state, folded from [`TransportEvent`]s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Position from the most recent tick
    pub position: f64,
    pub duration: f64,
    pub volume: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::with_volume(DEFAULT_VOLUME)
    }
}

impl PlaybackState {
    /// Create a stopped state at the given volume
    #[must_use]
    pub fn with_volume(volume: f64) -> Self {
        Self {
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Update the state from a transport event
    pub fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PositionChanged { position } => self.position = position,
            TransportEvent::MetadataLoaded { duration } => self.duration = duration,
            TransportEvent::PlaybackStarted => self.is_playing = true,
            TransportEvent::PlaybackPaused | TransportEvent::PlaybackEnded => {
                self.is_playing = false;
            }
        }
    }

    /// Change the volume, clamped to `0.0..=1.0`. Returns the applied value.
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        self.volume = volume.clamp(0.0, 1.0);
        self.volume
    }

    /// Fraction of the track played, 0.0 to 1.0.
    ///
    /// An unknown duration is treated as one second so the bar still moves.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let duration = if self.duration > 0.0 { self.duration } else { 1.0 };
        (self.position / duration).clamp(0.0, 1.0)
    }

    /// Elapsed time as `MM:SS`
    #[must_use]
    pub fn elapsed_label(&self) -> String {
        minutes_seconds(self.position)
    }

    /// Track length as `MM:SS`
    #[must_use]
    pub fn duration_label(&self) -> String {
        minutes_seconds(self.duration)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn minutes_seconds(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", (whole / 60) % 60, whole % 60)
}
