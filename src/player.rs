//! Player controller: the one owner of playback state.
//!
//! UI layers subscribe read-only through `Update` snapshots and dispatch
//! intents; the controller reacts to position ticks from the media backend
//! and emits fire-and-forget `MediaCommand`s that the event loop executes.

use crate::content::Track;
use crate::lyrics::{self, LyricLine};
use crate::media::MediaCommand;
use crate::timer::sanitize_position;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlayerError {
    #[error("track index {index} out of range ({len} tracks)")]
    TrackOutOfRange { index: usize, len: usize },
    #[error("lyric index {index} out of range ({len} lines)")]
    LyricOutOfRange { index: usize, len: usize },
}

pub struct Player {
    tracks: Vec<Track>,
    /// Meaningful only while `tracks` is non-empty.
    current: usize,
    playing: bool,
    muted: bool,
    /// Playback position as a fraction of the current track, clamped to [0, 1].
    ratio: f64,
    /// Last known duration of the current track in seconds; 0 while unknown.
    duration: f64,
    active_lyric: Option<usize>,
    /// Bumped on every track switch; ticks stamped with an older epoch are
    /// leftovers from a superseded track and are dropped.
    epoch: u64,
    /// Bumped on every observable state change, for update deduplication.
    version: u64,
    pending: Vec<MediaCommand>,
    /// One-shot scroll target, set when the active lyric changes.
    scroll_to: Option<usize>,
}

impl Player {
    pub fn new(tracks: Vec<Track>) -> Self {
        let mut player = Self {
            tracks,
            current: 0,
            playing: false,
            muted: false,
            ratio: 0.0,
            duration: 0.0,
            active_lyric: None,
            epoch: 0,
            version: 0,
            pending: Vec::new(),
            scroll_to: None,
        };
        if !player.tracks.is_empty() {
            player.load_current();
        }
        player
    }

    /// Full reset for the track at `self.current`: land paused at position
    /// zero with no active lyric, under a fresh epoch.
    fn load_current(&mut self) {
        self.epoch += 1;
        self.playing = false;
        self.ratio = 0.0;
        self.duration = 0.0;
        self.active_lyric = None;
        self.scroll_to = None;
        if let Some(track) = self.tracks.get(self.current) {
            self.pending.push(MediaCommand::Load(track.audio_url.clone()));
            self.pending.push(MediaCommand::SetPosition(0.0));
            // OpenUri may autoplay; a track switch must land paused.
            self.pending.push(MediaCommand::Pause);
            if self.muted {
                // A fresh source can reset the backend's volume.
                self.pending.push(MediaCommand::SetMuted(true));
            }
        }
        self.version += 1;
    }

    pub fn toggle_play(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.playing = !self.playing;
        self.pending.push(if self.playing {
            MediaCommand::Play
        } else {
            MediaCommand::Pause
        });
        self.version += 1;
    }

    pub fn toggle_mute(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.muted = !self.muted;
        self.pending.push(MediaCommand::SetMuted(self.muted));
        self.version += 1;
    }

    /// Consume one position tick from the media backend.
    ///
    /// Ticks from a superseded epoch are dropped. An unknown or zero
    /// duration is epsilon-guarded so the ratio stays bounded.
    pub fn on_position_tick(&mut self, epoch: u64, position: f64, duration: f64) {
        if epoch != self.epoch || self.tracks.is_empty() {
            return;
        }
        let position = sanitize_position(position);
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
        let ratio = (position / self.duration.max(f64::EPSILON)).clamp(0.0, 1.0);
        if (ratio - self.ratio).abs() > f64::EPSILON {
            self.ratio = ratio;
            self.version += 1;
        }
        let index = lyrics::active_index(self.current_lyrics(), position);
        if index != self.active_lyric {
            self.active_lyric = index;
            self.scroll_to = index;
            self.version += 1;
        }
    }

    /// Seek to a fraction of the current track. The ratio is applied
    /// optimistically; the next tick confirms or corrects it.
    pub fn seek_to(&mut self, ratio: f64) {
        if self.tracks.is_empty() {
            return;
        }
        let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        self.pending.push(MediaCommand::SetPosition(ratio * self.duration));
        self.ratio = ratio;
        self.version += 1;
    }

    /// Seek to the timestamp of one lyric line. Does not touch the
    /// transport state.
    pub fn seek_to_lyric(&mut self, index: usize) -> Result<(), PlayerError> {
        if self.tracks.is_empty() {
            return Ok(());
        }
        let lines = self.current_lyrics();
        let Some(line) = lines.get(index) else {
            return Err(PlayerError::LyricOutOfRange { index, len: lines.len() });
        };
        let time = line.time;
        self.pending.push(MediaCommand::SetPosition(time));
        Ok(())
    }

    pub fn next_track(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.tracks.len();
        self.load_current();
    }

    pub fn prev_track(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.current = (self.current + self.tracks.len() - 1) % self.tracks.len();
        self.load_current();
    }

    /// Natural end of playback chains into the next track, wrapping from
    /// the last track to the first. Never a stop.
    pub fn on_track_ended(&mut self) {
        self.next_track();
    }

    /// Explicit jump. Unlike next/prev this is bounds-checked: an
    /// out-of-range index is caller misuse and mutates nothing.
    pub fn select_track(&mut self, index: usize) -> Result<(), PlayerError> {
        if self.tracks.is_empty() {
            return Ok(());
        }
        if index >= self.tracks.len() {
            return Err(PlayerError::TrackOutOfRange { index, len: self.tracks.len() });
        }
        self.current = index;
        self.load_current();
        Ok(())
    }

    /// Reconcile with the observed transport state. An autoplay rejection
    /// surfaces here as an observed pause and silently reverts the
    /// optimistic `playing` flag.
    pub fn sync_transport(&mut self, playing: bool) {
        if self.tracks.is_empty() || playing == self.playing {
            return;
        }
        self.playing = playing;
        self.version += 1;
    }

    pub fn take_commands(&mut self) -> Vec<MediaCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn take_scroll(&mut self) -> Option<usize> {
        self.scroll_to.take()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> Option<usize> {
        if self.tracks.is_empty() { None } else { Some(self.current) }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    pub fn current_lyrics(&self) -> &[LyricLine] {
        self.current_track().map(|t| t.lyrics.as_slice()).unwrap_or(&[])
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn active_lyric(&self) -> Option<usize> {
        self.active_lyric
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parse_lrc;
    use std::sync::Arc;

    fn track(title: &str, lrc: &str) -> Track {
        Track {
            title: title.into(),
            audio_url: format!("https://cdn.example/{title}.mp3"),
            lyrics: Arc::new(parse_lrc(lrc)),
        }
    }

    fn player3() -> Player {
        Player::new(vec![
            track("one", "[00:01.00]a\n[00:03.00]b"),
            track("two", ""),
            track("three", "[00:00.50]x"),
        ])
    }

    #[test]
    fn new_player_loads_first_track_paused() {
        let mut player = player3();
        assert!(!player.is_playing());
        assert_eq!(player.current_index(), Some(0));
        let commands = player.take_commands();
        assert_eq!(commands[0], MediaCommand::Load("https://cdn.example/one.mp3".into()));
        assert!(commands.contains(&MediaCommand::Pause));
    }

    #[test]
    fn track_switch_is_a_full_reset() {
        let mut player = player3();
        player.take_commands();
        player.toggle_play();
        player.on_position_tick(player.epoch(), 2.0, 10.0);
        assert!(player.is_playing());
        assert_eq!(player.active_lyric(), Some(0));
        assert!(player.ratio() > 0.0);

        player.next_track();
        assert_eq!(player.current_index(), Some(1));
        assert!(!player.is_playing());
        assert_eq!(player.ratio(), 0.0);
        assert_eq!(player.active_lyric(), None);
        let commands = player.take_commands();
        assert!(commands.contains(&MediaCommand::Load("https://cdn.example/two.mp3".into())));
        assert!(commands.contains(&MediaCommand::SetPosition(0.0)));
        assert!(commands.contains(&MediaCommand::Pause));
    }

    #[test]
    fn next_and_prev_wrap_around() {
        let mut player = player3();
        player.select_track(2).unwrap();
        player.next_track();
        assert_eq!(player.current_index(), Some(0));
        player.prev_track();
        assert_eq!(player.current_index(), Some(2));
    }

    #[test]
    fn track_end_auto_advances_and_loops() {
        let mut player = player3();
        player.select_track(2).unwrap();
        player.on_track_ended();
        assert_eq!(player.current_index(), Some(0));
    }

    #[test]
    fn zero_duration_tick_keeps_ratio_bounded() {
        let mut player = player3();
        player.on_position_tick(player.epoch(), 5.0, 0.0);
        assert!(player.ratio().is_finite());
        assert!((0.0..=1.0).contains(&player.ratio()));
    }

    #[test]
    fn empty_playlist_degrades_to_no_ops() {
        let mut player = Player::new(Vec::new());
        player.toggle_play();
        player.toggle_mute();
        player.next_track();
        player.prev_track();
        player.on_track_ended();
        player.seek_to(0.5);
        player.on_position_tick(player.epoch(), 3.0, 10.0);
        assert!(player.select_track(0).is_ok());
        assert!(player.seek_to_lyric(0).is_ok());
        assert_eq!(player.current_index(), None);
        assert!(player.take_commands().is_empty());
        assert!(!player.is_playing());
    }

    #[test]
    fn out_of_range_selection_mutates_nothing() {
        let mut player = player3();
        player.take_commands();
        let version = player.version();
        assert_eq!(
            player.select_track(7),
            Err(PlayerError::TrackOutOfRange { index: 7, len: 3 })
        );
        assert_eq!(player.current_index(), Some(0));
        assert_eq!(player.version(), version);
        assert!(player.take_commands().is_empty());
    }

    #[test]
    fn stale_ticks_from_previous_track_are_ignored() {
        let mut player = player3();
        let stale_epoch = player.epoch();
        player.next_track();
        player.on_position_tick(stale_epoch, 50.0, 100.0);
        assert_eq!(player.ratio(), 0.0);
        assert_eq!(player.active_lyric(), None);
    }

    #[test]
    fn seek_is_optimistic_and_commands_the_backend() {
        let mut player = player3();
        player.take_commands();
        player.on_position_tick(player.epoch(), 0.0, 100.0);
        player.seek_to(0.5);
        assert_eq!(player.ratio(), 0.5);
        assert_eq!(player.take_commands(), vec![MediaCommand::SetPosition(50.0)]);
    }

    #[test]
    fn lyric_seek_targets_the_line_timestamp() {
        let mut player = player3();
        player.take_commands();
        player.toggle_play();
        player.take_commands();
        player.seek_to_lyric(1).unwrap();
        assert_eq!(player.take_commands(), vec![MediaCommand::SetPosition(3.0)]);
        assert!(player.is_playing());
        assert_eq!(
            player.seek_to_lyric(9),
            Err(PlayerError::LyricOutOfRange { index: 9, len: 2 })
        );
    }

    #[test]
    fn mute_survives_track_switches() {
        let mut player = player3();
        player.take_commands();
        player.toggle_mute();
        assert!(player.is_muted());
        assert_eq!(player.take_commands(), vec![MediaCommand::SetMuted(true)]);
        player.next_track();
        assert!(player.is_muted());
        assert!(player.take_commands().contains(&MediaCommand::SetMuted(true)));
    }

    #[test]
    fn scroll_target_fires_only_on_index_change() {
        let mut player = player3();
        let epoch = player.epoch();
        player.on_position_tick(epoch, 1.5, 10.0);
        assert_eq!(player.take_scroll(), Some(0));
        player.on_position_tick(epoch, 1.6, 10.0);
        assert_eq!(player.take_scroll(), None);
        player.on_position_tick(epoch, 3.1, 10.0);
        assert_eq!(player.take_scroll(), Some(1));
    }

    #[test]
    fn observed_pause_reverts_optimistic_play() {
        let mut player = player3();
        player.toggle_play();
        assert!(player.is_playing());
        player.sync_transport(false);
        assert!(!player.is_playing());
    }
}
