use std::time::Instant;

/// Monotonic position estimation between backend polls.
///
/// The backend reports positions at a slow cadence; the anchor pair
/// (position, instant) lets the tick loop produce smooth intermediate
/// positions while playing.
#[derive(Debug, PartialEq, Default)]
pub struct PlaybackTimer {
    /// Anchor position in seconds (finite, >= 0).
    anchor_position: f64,
    /// Monotonic instant corresponding to `anchor_position`; `None` while
    /// paused so wall-clock time spent paused is never counted.
    anchor_instant: Option<Instant>,
}

impl PlaybackTimer {
    /// Drop the running anchor and rewind to `position`. Used on track
    /// switches, where any previous anchor is stale.
    pub fn reset(&mut self, position: f64) {
        self.anchor_position = sanitize_position(position);
        self.anchor_instant = None;
    }

    /// Re-anchor at an observed position. Keeps estimates from
    /// double-counting when a sampled estimate is written back.
    pub fn set_position(&mut self, position: f64) {
        self.anchor_position = sanitize_position(position);
        self.anchor_instant = Some(Instant::now());
    }

    pub fn mark_playing(&mut self) {
        self.anchor_instant = Some(Instant::now());
    }

    pub fn mark_paused(&mut self) {
        self.anchor_instant = None;
    }

    pub fn estimate(&self, playing: bool) -> f64 {
        let base = self.anchor_position;
        if !playing {
            return base;
        }
        match self.anchor_instant {
            Some(instant) => {
                let estimated = base + instant.elapsed().as_secs_f64();
                if estimated.is_finite() { estimated } else { base }
            }
            None => base,
        }
    }
}

pub fn sanitize_position(position: f64) -> f64 {
    if !position.is_finite() || position < 0.0 {
        0.0
    } else {
        position
    }
}
