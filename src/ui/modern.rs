//! Full-screen TUI: synchronized lyric display with transport controls.
//!
//! The event loop uses `tokio::select!` to handle:
//! - state snapshots from the playback loop
//! - user keyboard input and mouse swipes
//!
//! Scrolling follows the one-shot scroll target carried by each snapshot,
//! so the lyric pane re-centers only when the active line changes, not on
//! every position tick.

use crate::content::Theme;
use crate::event::{Intent, Update};
use crate::ui::gesture::{Swipe, SwipeTracker};
use crate::ui::styles::LyricStyles;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Gauge, Paragraph},
};
use std::io;
use std::thread;
use tokio::sync::mpsc;

const KEY_HINT: &str =
    "space play/pause  m mute  n/p track  \u{2190}/\u{2192} seek  PgUp/PgDn line  q quit";

#[derive(Default)]
struct UiState {
    update: Option<Update>,
    /// Lyric index the pane is centered on; follows scroll targets.
    scroll_line: usize,
    last_track: Option<usize>,
    should_exit: bool,
}

fn absorb_update(state: &mut UiState, update: Update) {
    if state.last_track != Some(update.track) {
        state.scroll_line = 0;
        state.last_track = Some(update.track);
    }
    if let Some(target) = update.scroll_to {
        state.scroll_line = target;
    }
    state.update = Some(update);
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn intent_for_key(key: &KeyEvent, update: Option<&Update>) -> Option<Intent> {
    match key.code {
        KeyCode::Char(' ') => Some(Intent::TogglePlay),
        KeyCode::Char('m') => Some(Intent::ToggleMute),
        KeyCode::Char('n') | KeyCode::Tab => Some(Intent::NextTrack),
        KeyCode::Char('p') | KeyCode::BackTab => Some(Intent::PrevTrack),
        KeyCode::Left => Some(Intent::SeekBy(-0.05)),
        KeyCode::Right => Some(Intent::SeekBy(0.05)),
        KeyCode::PageDown => {
            let update = update?;
            let next = update.index.map_or(0, |i| i + 1);
            (next < update.lines.len()).then_some(Intent::SeekLyric(next))
        }
        KeyCode::PageUp => {
            let index = update?.index?;
            (index > 0).then(|| Intent::SeekLyric(index - 1))
        }
        KeyCode::Char(digit @ '1'..='9') => {
            Some(Intent::SelectTrack(digit as usize - '1' as usize))
        }
        _ => None,
    }
}

/// A left click on the progress gauge row is an absolute seek to the
/// clicked fraction of the track.
fn gauge_seek(mouse: &MouseEvent, width: u16, height: u16) -> Option<Intent> {
    if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
        return None;
    }
    // The gauge sits on the second-to-last row of the layout.
    if height < 2 || mouse.row != height - 2 {
        return None;
    }
    let span = f64::from(width.saturating_sub(1).max(1));
    Some(Intent::Seek((f64::from(mouse.column) / span).clamp(0.0, 1.0)))
}

/// Run the TUI until quit or until the playback loop goes away.
pub async fn run(
    mut update_rx: mpsc::Receiver<Update>,
    intent_tx: mpsc::Sender<Intent>,
    theme: Option<Theme>,
    version_title: String,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let styles = LyricStyles::from_theme(theme.as_ref());
    let mut state = UiState::default();
    let mut swipes = SwipeTracker::default();

    // Single background thread forwarding crossterm events into the async
    // runtime; try_send lets it exit once the receiver is gone.
    let (event_tx, mut event_rx) = mpsc::channel(32);
    thread::spawn(move || {
        loop {
            match crossterm::event::poll(std::time::Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(event) = crossterm::event::read()
                        && event_tx.try_send(event).is_err()
                    {
                        break;
                    }
                }
                Ok(false) => {}
                Err(_) => std::thread::sleep(std::time::Duration::from_millis(100)),
            }
        }
    });

    while !state.should_exit {
        terminal.draw(|frame| draw_ui(frame, &state, &styles, &version_title))?;

        tokio::select! {
            biased;

            maybe_update = update_rx.recv() => {
                match maybe_update {
                    Some(update) => absorb_update(&mut state, update),
                    None => state.should_exit = true,
                }
            }

            maybe_event = event_rx.recv() => {
                let Some(event) = maybe_event else {
                    state.should_exit = true;
                    continue;
                };
                match event {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        if is_quit(&key) {
                            let _ = intent_tx.send(Intent::Quit).await;
                            state.should_exit = true;
                        } else if let Some(intent) = intent_for_key(&key, state.update.as_ref()) {
                            let _ = intent_tx.send(intent).await;
                        }
                    }
                    Event::Mouse(mouse) => {
                        let (width, height) = crossterm::terminal::size().unwrap_or((0, 0));
                        if let Some(intent) = gauge_seek(&mouse, width, height) {
                            let _ = intent_tx.send(intent).await;
                        } else if let Some(swipe) = swipes.observe(&mouse) {
                            let intent = match swipe {
                                Swipe::Left => Intent::NextTrack,
                                Swipe::Right => Intent::PrevTrack,
                            };
                            let _ = intent_tx.send(intent).await;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

fn draw_ui(frame: &mut Frame, state: &UiState, styles: &LyricStyles, version_title: &str) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(styles.background)),
        area,
    );
    let [header_area, lyric_area, gauge_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let Some(update) = &state.update else {
        frame.render_widget(
            Paragraph::new("Loading content version\u{2026}")
                .alignment(Alignment::Center)
                .style(styles.hint),
            lyric_area,
        );
        return;
    };

    let header = if update.track_count == 0 {
        version_title.to_string()
    } else {
        let transport = if update.playing { "\u{25b6}" } else { "\u{23f8}" };
        let mute = if update.muted { "  [muted]" } else { "" };
        format!(
            "{transport}  {version_title} \u{00b7} {} ({}/{}){mute}",
            update.track_title,
            update.track + 1,
            update.track_count
        )
    };
    frame.render_widget(
        Paragraph::new(header)
            .alignment(Alignment::Center)
            .style(styles.header),
        header_area,
    );

    draw_lyrics(frame, lyric_area, update, state.scroll_line, styles);

    if update.track_count > 0 {
        frame.render_widget(
            Gauge::default()
                .ratio(update.ratio.clamp(0.0, 1.0))
                .gauge_style(Style::default().fg(styles.accent).bg(styles.background))
                .use_unicode(true)
                .label(""),
            gauge_area,
        );
    }
    frame.render_widget(
        Paragraph::new(KEY_HINT)
            .alignment(Alignment::Center)
            .style(styles.hint),
        hint_area,
    );
}

fn draw_lyrics(
    frame: &mut Frame,
    area: Rect,
    update: &Update,
    scroll_line: usize,
    styles: &LyricStyles,
) {
    if update.lines.is_empty() {
        let message = if update.track_count == 0 {
            "This version has no playable audio"
        } else {
            "No synced lyrics for this track"
        };
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(styles.before),
            area,
        );
        return;
    }

    let width = usize::from(area.width.saturating_sub(4)).max(8);
    let mut rows: Vec<Line> = Vec::new();
    let mut first_row = vec![0usize; update.lines.len()];
    for (i, lyric) in update.lines.iter().enumerate() {
        first_row[i] = rows.len();
        let style = match update.index {
            Some(active) if i == active => styles.current,
            Some(active) if i < active => styles.before,
            _ => styles.after,
        };
        for piece in textwrap::wrap(&lyric.text, width) {
            rows.push(Line::styled(piece.into_owned(), style));
        }
    }

    let viewport = usize::from(area.height);
    let anchor = first_row.get(scroll_line).copied().unwrap_or(0);
    let offset = anchor.saturating_sub(viewport / 2);
    frame.render_widget(
        Paragraph::new(Text::from(rows))
            .alignment(Alignment::Center)
            .scroll((offset as u16, 0)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::LyricLine;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn update_with_lines(count: usize, index: Option<usize>) -> Update {
        Update {
            lines: Arc::new(
                (0..count)
                    .map(|i| LyricLine { time: i as f64, text: format!("line {i}") })
                    .collect(),
            ),
            index,
            track_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn transport_keys_map_to_intents() {
        assert_eq!(intent_for_key(&key(KeyCode::Char(' ')), None), Some(Intent::TogglePlay));
        assert_eq!(intent_for_key(&key(KeyCode::Char('m')), None), Some(Intent::ToggleMute));
        assert_eq!(intent_for_key(&key(KeyCode::Char('n')), None), Some(Intent::NextTrack));
        assert_eq!(intent_for_key(&key(KeyCode::Char('3')), None), Some(Intent::SelectTrack(2)));
        assert_eq!(intent_for_key(&key(KeyCode::Char('x')), None), None);
    }

    #[test]
    fn line_stepping_respects_bounds() {
        let update = update_with_lines(2, Some(1));
        assert_eq!(intent_for_key(&key(KeyCode::PageDown), Some(&update)), None);
        assert_eq!(
            intent_for_key(&key(KeyCode::PageUp), Some(&update)),
            Some(Intent::SeekLyric(0))
        );

        let before_first = update_with_lines(2, None);
        assert_eq!(
            intent_for_key(&key(KeyCode::PageDown), Some(&before_first)),
            Some(Intent::SeekLyric(0))
        );
        assert_eq!(intent_for_key(&key(KeyCode::PageUp), Some(&before_first)), None);
    }

    #[test]
    fn gauge_clicks_become_absolute_seeks() {
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 40,
            row: 22,
            modifiers: KeyModifiers::NONE,
        };
        match gauge_seek(&click, 81, 24) {
            Some(Intent::Seek(ratio)) => assert!((ratio - 0.5).abs() < 1e-9),
            other => panic!("expected an absolute seek, got {other:?}"),
        }

        // Clicks off the gauge row and button releases are not seeks.
        let off_row = MouseEvent { row: 10, ..click };
        assert_eq!(gauge_seek(&off_row, 81, 24), None);
        let release = MouseEvent { kind: MouseEventKind::Up(MouseButton::Left), ..click };
        assert_eq!(gauge_seek(&release, 81, 24), None);
    }

    #[test]
    fn scroll_target_moves_the_anchor_only_on_change() {
        let mut state = UiState::default();
        let mut update = update_with_lines(10, Some(4));
        update.scroll_to = Some(4);
        absorb_update(&mut state, update);
        assert_eq!(state.scroll_line, 4);

        // Ratio-only snapshot: no scroll target, anchor stays put.
        let tick_only = update_with_lines(10, Some(4));
        absorb_update(&mut state, tick_only);
        assert_eq!(state.scroll_line, 4);

        // Track switch rewinds the pane.
        let mut switched = update_with_lines(3, None);
        switched.track = 1;
        absorb_update(&mut state, switched);
        assert_eq!(state.scroll_line, 0);
    }
}
