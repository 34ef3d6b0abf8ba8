//! LRC lyric parsing
//!
//! Supports `[mm:ss.xx]`, `[mm:ss:xx]` and `[mm:ss]` timestamps. A line may
//! carry several timestamps; each one yields its own entry. Header tags such
//! as `[ar:Artist]` are ignored.

use serde::Serialize;

/// Tolerance applied when matching the playback position to a line
const LINE_LEAD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricLine {
    /// Seconds from the start of the track
    pub time: f64,
    pub text: String,
}

/// Parse LRC content into lines sorted by time
pub fn parse_lrc(content: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw in content.lines() {
        let mut rest = raw.trim_start();
        let mut stamps = Vec::new();

        while let Some((stamp, after)) = rest
            .strip_prefix('[')
            .and_then(|r| r.split_once(']'))
            .and_then(|(tag, after)| parse_timestamp(tag).map(|t| (t, after)))
        {
            stamps.push(stamp);
            rest = after;
        }

        let text = rest.trim();
        lines.extend(stamps.into_iter().map(|time| LyricLine {
            time,
            text: text.to_string(),
        }));
    }

    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}

/// Whether the content carries at least one timestamped line
pub fn is_synced(content: &str) -> bool {
    !parse_lrc(content).is_empty()
}

/// Index of the line active at `position`, or `None` before the first line
pub fn find_current_line(lines: &[LyricLine], position: f64) -> Option<usize> {
    lines.iter().rposition(|line| position >= line.time - LINE_LEAD)
}

/// `mm:ss`, `mm:ss.f` or `mm:ss:f`, with 1-3 minute digits and 1-3 fraction digits
fn parse_timestamp(tag: &str) -> Option<f64> {
    let (minutes, rest) = tag.split_once(':')?;
    let (seconds, fraction) = match rest.find(['.', ':']) {
        Some(i) => (&rest[..i], Some(&rest[i + 1..])),
        None => (rest, None),
    };

    if !(1..=3).contains(&minutes.len()) || seconds.len() != 2 {
        return None;
    }
    let minutes: u32 = digits(minutes)?;
    let seconds: u32 = digits(seconds)?;

    let millis = match fraction {
        Some(f) if (1..=3).contains(&f.len()) => digits::<u32>(&format!("{f:0<3}"))?,
        Some(_) => return None,
        None => 0,
    };

    Some(f64::from(minutes * 60 + seconds) + f64::from(millis) / 1000.0)
}

fn digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}
