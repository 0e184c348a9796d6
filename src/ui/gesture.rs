//! Horizontal swipe recognition from terminal mouse events.
//!
//! A left-button press anchors the gesture; the release decides whether the
//! pointer travelled far enough horizontally to count as a swipe. Swipes
//! reduce to the same next/prev intents the keyboard uses.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

/// Minimum horizontal travel, in columns, for a drag to count as a swipe.
const SWIPE_MIN_COLUMNS: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Left,
    Right,
}

#[derive(Debug, Default)]
pub struct SwipeTracker {
    origin: Option<u16>,
}

impl SwipeTracker {
    pub fn observe(&mut self, event: &MouseEvent) -> Option<Swipe> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some(event.column);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let origin = self.origin.take()?;
                let travel = i32::from(event.column) - i32::from(origin);
                if travel <= -SWIPE_MIN_COLUMNS {
                    Some(Swipe::Left)
                } else if travel >= SWIPE_MIN_COLUMNS {
                    Some(Swipe::Right)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row: 10,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn long_drags_become_swipes() {
        let mut tracker = SwipeTracker::default();
        assert_eq!(tracker.observe(&mouse(MouseEventKind::Down(MouseButton::Left), 40)), None);
        assert_eq!(
            tracker.observe(&mouse(MouseEventKind::Up(MouseButton::Left), 20)),
            Some(Swipe::Left)
        );

        tracker.observe(&mouse(MouseEventKind::Down(MouseButton::Left), 10));
        assert_eq!(
            tracker.observe(&mouse(MouseEventKind::Up(MouseButton::Left), 30)),
            Some(Swipe::Right)
        );
    }

    #[test]
    fn short_drags_and_clicks_are_not_swipes() {
        let mut tracker = SwipeTracker::default();
        tracker.observe(&mouse(MouseEventKind::Down(MouseButton::Left), 40));
        assert_eq!(tracker.observe(&mouse(MouseEventKind::Up(MouseButton::Left), 44)), None);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut tracker = SwipeTracker::default();
        assert_eq!(tracker.observe(&mouse(MouseEventKind::Up(MouseButton::Left), 0)), None);
    }
}
