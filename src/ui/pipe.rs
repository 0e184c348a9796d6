//! Pipe mode: print the active lyric line to stdout as playback reaches it.

use crate::event::Update;
use tokio::sync::mpsc;

pub async fn run(
    mut update_rx: mpsc::Receiver<Update>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // (track, lyric index) of the last printed line; a track switch resets
    // the dedup key on its own.
    let mut last_printed: Option<(usize, usize)> = None;
    while let Some(update) = update_rx.recv().await {
        let Some(index) = update.index else {
            continue;
        };
        let key = (update.track, index);
        if last_printed == Some(key) {
            continue;
        }
        if let Some(line) = update.lines.get(index) {
            println!("{}", line.text);
            last_printed = Some(key);
        }
    }
    Ok(())
}
