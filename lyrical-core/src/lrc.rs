use crate::time::{self, SENTINEL_TAG, UNTIMED_CLOCK};
use std::cmp::Ordering;
use uuid::Uuid;

/// A single line of lyrics, optionally carrying a timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Stable identity for the lifetime of the line within a session
    pub id: Uuid,
    pub text: String,
    /// Offset from the start of the audio in seconds, `None` until marked
    pub time: Option<f64>,
}

impl LyricLine {
    /// Create a line with a fresh identifier
    #[must_use]
    pub fn new(text: impl Into<String>, time: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            time,
        }
    }

    /// Create a line that has not been marked yet
    #[must_use]
    pub fn untimed(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// Create a line starting at `time` seconds
    #[must_use]
    pub fn timed(text: impl Into<String>, time: f64) -> Self {
        Self::new(text, Some(time))
    }

    #[must_use]
    pub const fn is_timed(&self) -> bool {
        self.time.is_some()
    }

    /// The LRC tag this line is written with
    #[must_use]
    pub fn tag(&self) -> String {
        self.time.map_or_else(|| SENTINEL_TAG.to_string(), time::encode)
    }

    /// The time as shown next to the line in an editor, e.g. `01:02.50`
    #[must_use]
    pub fn clock(&self) -> String {
        self.time.map_or_else(|| UNTIMED_CLOCK.to_string(), time::format_clock)
    }
}

/// Parse LRC text into lyric lines.
///
/// Lines starting with a time tag keep their text even when it is empty
/// (instrumental markers). Untagged lines are trimmed and dropped when
/// blank. The result lists timed lines in ascending time order followed by
/// untimed lines in their original order; equal times keep input order.
///
/// Parsing never fails: anything that is not a well-formed leading tag is
/// treated as plain text.
#[must_use]
pub fn parse(input: &str) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = input.lines().filter_map(parse_line).collect();
    // sort_by is stable
    lines.sort_by(|a, b| compare_times(a.time, b.time));
    lines
}

/// Parse lyrics embedded in an audio file, if there are any
#[must_use]
pub fn parse_embedded(input: Option<&str>) -> Vec<LyricLine> {
    input.map(parse).unwrap_or_default()
}

/// Split plain text into untimed lines, one per non-blank input line.
///
/// Time tags are not interpreted; this is the path for pasting raw lyrics.
#[must_use]
pub fn parse_plain(input: &str) -> Vec<LyricLine> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(LyricLine::untimed)
        .collect()
}

/// Serialize lyric lines to LRC text.
///
/// Each line becomes `<tag> <text>` with a single space after the tag.
/// Untimed lines are written with [`SENTINEL_TAG`], lines with blank text
/// are skipped, and lines are joined by `\n` with no trailing newline.
#[must_use]
pub fn serialize(lines: &[LyricLine]) -> String {
    lines
        .iter()
        .filter(|line| !line.text.trim().is_empty())
        .map(|line| format!("{} {}", line.tag(), line.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Find the line playing at `position`: the first timed line that has
/// started while the next timed line after it has not.
///
/// Untimed lines are never current and are skipped when looking for the
/// next start.
#[must_use]
pub fn current_line_index(lines: &[LyricLine], position: f64) -> Option<usize> {
    lines.iter().enumerate().find_map(|(i, line)| {
        let start = line.time?;
        if position < start {
            return None;
        }
        let next_start = lines.get(i + 1..)?.iter().find_map(|next| next.time);
        match next_start {
            Some(next) if position >= next => None,
            _ => Some(i),
        }
    })
}

fn parse_line(line: &str) -> Option<LyricLine> {
    if let Some((time, rest)) = time::strip_leading_tag(line) {
        return Some(LyricLine::timed(rest.trim(), time));
    }

    let text = line.trim();
    if text.is_empty() {
        None
    } else {
        Some(LyricLine::untimed(text))
    }
}

fn compare_times(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
