use crate::lyrics::types::LyricLine;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,2}):(\d{2})(?:[.](\d{1,3}))?\]").unwrap());

/// Parse LRC-style timed lyrics into sorted `LyricLine`s.
///
/// Every `[mm:ss]` / `[mm:ss.fff]` tag on a line yields one entry whose text
/// is the line with all tags stripped and trimmed. Lines without a tag, and
/// lines whose text is blank after stripping, are dropped. Malformed input
/// degrades to fewer entries; this function never fails.
pub fn parse_lrc(raw: &str) -> Vec<LyricLine> {
    let re = &TIME_TAG_RE;
    let mut lines = Vec::new();
    for line in raw.lines() {
        let tags: Vec<_> = re.captures_iter(line).collect();
        if tags.is_empty() {
            continue;
        }
        let text = re.replace_all(line, "").trim().to_string();
        if text.is_empty() {
            continue;
        }
        for cap in tags {
            let Some(time) = tag_to_seconds(&cap) else {
                continue;
            };
            lines.push(LyricLine {
                time,
                text: text.clone(),
            });
        }
    }
    // Stable, so ties keep their input order.
    lines.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
    lines
}

fn tag_to_seconds(cap: &regex::Captures<'_>) -> Option<f64> {
    let min: u32 = cap.get(1)?.as_str().parse().ok()?;
    let sec: u32 = cap.get(2)?.as_str().parse().ok()?;
    let millis = match cap.get(3) {
        Some(frac) => {
            // Right-pad to milliseconds: ".5" is 500ms, ".12" is 120ms.
            let mut digits = frac.as_str().to_string();
            while digits.len() < 3 {
                digits.push('0');
            }
            digits.parse::<u32>().ok()?
        }
        None => 0,
    };
    Some(f64::from(min) * 60.0 + f64::from(sec) + f64::from(millis) / 1000.0)
}
