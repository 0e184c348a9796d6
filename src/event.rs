//! User intents and UI update snapshots.

use crate::lyrics::LyricLine;
use crate::player::Player;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// One control surface for every input source: buttons, keys and swipe
/// gestures all reduce to these intents.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    TogglePlay,
    ToggleMute,
    NextTrack,
    PrevTrack,
    SelectTrack(usize),
    /// Absolute seek to a position ratio in [0, 1].
    Seek(f64),
    /// Relative seek by a ratio delta (arrow keys).
    SeekBy(f64),
    SeekLyric(usize),
    Quit,
}

/// Read-only snapshot of the playback state, pushed to the UI whenever the
/// controller's version changes.
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub lines: Arc<Vec<LyricLine>>,
    pub index: Option<usize>,
    pub track: usize,
    pub track_count: usize,
    pub track_title: String,
    pub playing: bool,
    pub muted: bool,
    pub ratio: f64,
    /// One-shot scroll-into-view target; set only when the active lyric
    /// changed since the previous snapshot.
    pub scroll_to: Option<usize>,
    pub version: u64,
}

/// Apply one intent to the controller. Caller-misuse errors (out-of-range
/// indices) are logged and dropped; the UI layer has nothing to do with them.
pub fn apply_intent(player: &mut Player, intent: &Intent) {
    match intent {
        Intent::TogglePlay => player.toggle_play(),
        Intent::ToggleMute => player.toggle_mute(),
        Intent::NextTrack => player.next_track(),
        Intent::PrevTrack => player.prev_track(),
        Intent::SelectTrack(index) => {
            if let Err(err) = player.select_track(*index) {
                warn!(%err, "ignoring track selection");
            }
        }
        Intent::Seek(ratio) => player.seek_to(*ratio),
        Intent::SeekBy(delta) => player.seek_to((player.ratio() + delta).clamp(0.0, 1.0)),
        Intent::SeekLyric(index) => {
            if let Err(err) = player.seek_to_lyric(*index) {
                warn!(%err, "ignoring lyric seek");
            }
        }
        Intent::Quit => {}
    }
}

/// Build an `Update` from the controller, consuming its one-shot scroll
/// target.
pub fn snapshot(player: &mut Player) -> Update {
    let scroll_to = player.take_scroll();
    Update {
        lines: player
            .current_track()
            .map(|t| Arc::clone(&t.lyrics))
            .unwrap_or_default(),
        index: player.active_lyric(),
        track: player.current_index().unwrap_or(0),
        track_count: player.tracks().len(),
        track_title: player
            .current_track()
            .map(|t| t.title.clone())
            .unwrap_or_default(),
        playing: player.is_playing(),
        muted: player.is_muted(),
        ratio: player.ratio(),
        scroll_to,
        version: player.version(),
    }
}

/// Send a snapshot if the version moved past the last sent one (or `force`).
pub async fn send_update(
    player: &mut Player,
    update_tx: &mpsc::Sender<Update>,
    last_sent: &mut Option<u64>,
    force: bool,
) {
    let version = player.version();
    if !force && *last_sent == Some(version) {
        return;
    }
    if update_tx.send(snapshot(player)).await.is_ok() {
        *last_sent = Some(version);
    }
}
