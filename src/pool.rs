//! Central playback loop.
//!
//! Owns the controller and the media backend: polls the backend at a slow
//! cadence, estimates intermediate positions with a monotonic anchor, feeds
//! ticks and user intents into the controller, drains its queued commands,
//! and pushes deduplicated state snapshots to the UI.

use crate::event::{self, Intent, Update};
use crate::media::{MediaControl, MediaSnapshot};
use crate::player::Player;
use crate::timer::PlaybackTimer;
use tokio::sync::mpsc;
use tokio::time::{Duration, interval};
use tracing::{debug, warn};

/// Cadence of real backend polls (position, duration, status).
const SYNC_INTERVAL: Duration = Duration::from_millis(1000);
/// Cadence of estimated position ticks into the controller.
const TICK_INTERVAL: Duration = Duration::from_millis(200);
/// An estimated position within this many seconds of a known duration
/// counts as end of track.
const ENDED_SLACK: f64 = 0.3;
/// After a track switch a poll counts as the new source only once its
/// position is within this many seconds of the start.
const SWITCH_CONFIRM_SLACK: f64 = 1.0;
/// After this many held-back polls the backend's report is accepted as-is,
/// so an externally seeked source cannot wedge the loop.
const SWITCH_CONFIRM_LIMIT: u32 = 8;

fn reached_end(position: f64, duration: f64) -> bool {
    duration > 0.0 && position + ENDED_SLACK >= duration
}

/// Poll-side view of the backend: the estimation anchor, the last known
/// duration, and whether a commanded track switch still awaits confirmation.
///
/// `Load` is fire-and-forget and a network source can take seconds to land,
/// so right after a switch the backend may keep reporting the previous
/// track. Those polls are held back; applying them would carry the old
/// track's position and duration into the freshly reset one.
#[derive(Default)]
struct SyncState {
    timer: PlaybackTimer,
    duration: f64,
    awaiting_switch: bool,
    held_polls: u32,
}

impl SyncState {
    /// A new source was commanded: drop everything learned about the old
    /// one and distrust polls until the backend reports the new start.
    fn begin_switch(&mut self) {
        self.timer.reset(0.0);
        self.duration = 0.0;
        self.awaiting_switch = true;
        self.held_polls = 0;
    }

    /// Apply one polled snapshot. Returns false when the snapshot was held
    /// back because it still describes the pre-switch source.
    fn absorb(&mut self, snapshot: &MediaSnapshot, player: &mut Player) -> bool {
        if self.awaiting_switch {
            if snapshot.position > SWITCH_CONFIRM_SLACK
                && self.held_polls < SWITCH_CONFIRM_LIMIT
            {
                self.held_polls += 1;
                debug!(
                    position = snapshot.position,
                    "backend still reports the previous source"
                );
                return false;
            }
            self.awaiting_switch = false;
        }
        self.timer.set_position(snapshot.position);
        if let Some(known) = snapshot.duration {
            self.duration = known;
        }
        if let Some(playing) = snapshot.playing {
            player.sync_transport(playing);
        }
        if !player.is_playing() {
            self.timer.mark_paused();
        }
        true
    }
}

pub async fn listen<M: MediaControl>(
    media: M,
    mut player: Player,
    mut intent_rx: mpsc::Receiver<Intent>,
    update_tx: mpsc::Sender<Update>,
) {
    let mut sync_state = SyncState::default();
    // The startup queue loads the first track; until the backend picks it
    // up, polls describe whatever it was playing before.
    sync_state.begin_switch();
    let mut last_sent: Option<u64> = None;
    let mut sync = interval(SYNC_INTERVAL);
    let mut tick = interval(TICK_INTERVAL);

    // Execute the initial track load queued by the controller.
    drain_commands(&media, &mut player).await;
    event::send_update(&mut player, &update_tx, &mut last_sent, true).await;

    loop {
        tokio::select! {
            maybe_intent = intent_rx.recv() => {
                let Some(intent) = maybe_intent else { break };
                if intent == Intent::Quit {
                    break;
                }
                let epoch_before = player.epoch();
                event::apply_intent(&mut player, &intent);
                drain_commands(&media, &mut player).await;
                if player.epoch() != epoch_before {
                    sync_state.begin_switch();
                } else {
                    match intent {
                        // A seek moved the real position; re-anchor now
                        // rather than waiting for the next scheduled sync.
                        Intent::Seek(_) | Intent::SeekBy(_) | Intent::SeekLyric(_) => {
                            sync_with_backend(&media, &mut player, &mut sync_state).await;
                        }
                        Intent::TogglePlay => {
                            if player.is_playing() {
                                sync_state.timer.mark_playing();
                            } else {
                                sync_state.timer.mark_paused();
                            }
                        }
                        _ => {}
                    }
                }
                event::send_update(&mut player, &update_tx, &mut last_sent, false).await;
            }

            _ = sync.tick() => {
                sync_with_backend(&media, &mut player, &mut sync_state).await;
                event::send_update(&mut player, &update_tx, &mut last_sent, false).await;
            }

            _ = tick.tick() => {
                let position = sync_state.timer.estimate(player.is_playing());
                player.on_position_tick(player.epoch(), position, sync_state.duration);
                if player.is_playing() && reached_end(position, sync_state.duration) {
                    player.on_track_ended();
                    sync_state.begin_switch();
                }
                drain_commands(&media, &mut player).await;
                event::send_update(&mut player, &update_tx, &mut last_sent, false).await;
            }
        }
    }

    // Leave the external player paused rather than playing into a dead UI.
    shutdown(&media, &mut player).await;
    event::send_update(&mut player, &update_tx, &mut last_sent, true).await;
}

async fn sync_with_backend<M: MediaControl>(
    media: &M,
    player: &mut Player,
    sync: &mut SyncState,
) {
    match media.poll().await {
        Ok(snapshot) => {
            sync.absorb(&snapshot, player);
        }
        Err(err) => debug!(%err, "media poll failed"),
    }
}

async fn shutdown<M: MediaControl>(media: &M, player: &mut Player) {
    if player.is_playing() {
        player.toggle_play();
    }
    drain_commands(media, player).await;
}

async fn drain_commands<M: MediaControl>(media: &M, player: &mut Player) {
    for cmd in player.take_commands() {
        if let Err(err) = media.apply(cmd.clone()).await {
            warn!(%err, ?cmd, "media command failed");
        }
    }
}
