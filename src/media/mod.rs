//! Media backend abstraction: the capability the player controller drives.
//!
//! Commands are fire-and-forget requests; the controller never awaits their
//! completion and reconciles its optimistic state against the next polled
//! snapshot.

pub mod mpris;

pub use mpris::MprisMedia;

/// A command issued by the controller to the media primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    /// Load (and possibly start) a new audio source.
    Load(String),
    Play,
    Pause,
    /// Absolute position in seconds.
    SetPosition(f64),
    SetMuted(bool),
}

/// Observed playback state at one poll instant. Fields the backend could
/// not determine stay `None` and leave the controller's view untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaSnapshot {
    pub position: f64,
    pub duration: Option<f64>,
    pub playing: Option<bool>,
}

#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("D-Bus error: {0}")]
    ZBus(#[from] zbus::Error),
    #[error("failed to establish D-Bus connection")]
    NoConnection,
}

#[allow(async_fn_in_trait)]
pub trait MediaControl {
    async fn apply(&self, cmd: MediaCommand) -> Result<(), MediaError>;
    async fn poll(&self) -> Result<MediaSnapshot, MediaError>;
}
