use crate::lyrics::types::LyricLine;
use std::cmp::Ordering;

/// Map a playback position to the active lyric index.
///
/// Returns `None` when `lines` is empty or `position` is before the first
/// timestamp, otherwise the largest `i` with `lines[i].time <= position`.
/// `lines` must already be sorted ascending (the parser's contract).
pub fn active_index(lines: &[LyricLine], position: f64) -> Option<usize> {
    if lines.is_empty() || position.is_nan() {
        return None;
    }
    let mut idx = match lines
        .binary_search_by(|line| line.time.partial_cmp(&position).unwrap_or(Ordering::Less))
    {
        Ok(idx) => idx,
        Err(0) => return None,
        Err(idx) => idx - 1,
    };
    // Equal timestamps: settle on the last line at or before `position`.
    while idx + 1 < lines.len() && lines[idx + 1].time <= position {
        idx += 1;
    }
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(times: &[f64]) -> Vec<LyricLine> {
        times
            .iter()
            .map(|&time| LyricLine { time, text: format!("t{time}") })
            .collect()
    }

    #[test]
    fn boundaries() {
        let lines = lines(&[1.0, 3.0]);
        assert_eq!(active_index(&lines, 0.5), None);
        assert_eq!(active_index(&lines, 1.0), Some(0));
        assert_eq!(active_index(&lines, 2.9), Some(0));
        assert_eq!(active_index(&lines, 3.0), Some(1));
        assert_eq!(active_index(&lines, 100.0), Some(1));
    }

    #[test]
    fn empty_sequence_is_never_active() {
        assert_eq!(active_index(&[], 0.0), None);
        assert_eq!(active_index(&[], 1e9), None);
    }

    #[test]
    fn equal_timestamps_resolve_to_last() {
        let lines = lines(&[1.0, 2.0, 2.0, 2.0, 5.0]);
        assert_eq!(active_index(&lines, 2.0), Some(3));
        assert_eq!(active_index(&lines, 4.9), Some(3));
    }

    #[test]
    fn nan_position_maps_to_none() {
        let lines = lines(&[0.0, 1.0]);
        assert_eq!(active_index(&lines, f64::NAN), None);
    }
}
