//! Conversion between seconds and LRC time tags.
//!
//! Tags are written as `[mm:ss.cc]` (centiseconds). Reading accepts both the
//! two-digit centisecond form and the three-digit millisecond form
//! `[mm:ss.mmm]` that some editors produce.

/// Tag written for lines that have no timestamp yet.
pub const SENTINEL_TAG: &str = "[00:00.00]";

/// Clock text shown for a line that has no timestamp yet.
pub const UNTIMED_CLOCK: &str = "--:--.--";

/// Slack added before truncating, in centiseconds. Far below the precision
/// of a tag but above the representation error of `f64` in the tag range.
const CENTI_EPSILON: f64 = 1e-6;

/// Encode a position in seconds as an LRC time tag, e.g. `[01:02.50]`.
///
/// The position is truncated to whole centiseconds, so `59.996` becomes
/// `[00:59.99]` rather than rolling over to the next minute. Values stored
/// just below an exact centisecond (`1.15` is `1.1499999...`) still encode
/// to that centisecond, so decoded tags encode back unchanged. Minutes are
/// padded to two digits but never cut, so positions past 99
/// minutes produce a wider field.
#[must_use]
pub fn encode(seconds: f64) -> String {
    format!("[{}]", format_clock(seconds))
}

/// Same as [`encode`] without the surrounding brackets, for display.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_clock(seconds: f64) -> String {
    // Float to int casts saturate, so negative or NaN input collapses to zero
    let total_centis = (seconds * 100.0 + CENTI_EPSILON).floor() as u64;
    let minutes = total_centis / 6000;
    let secs = total_centis / 100 % 60;
    let centis = total_centis % 100;
    format!("{minutes:02}:{secs:02}.{centis:02}")
}

/// Find the first `[mm:ss.xx]` or `[mm:ss.xxx]` tag anywhere in `text` and
/// return its value in seconds.
#[must_use]
pub fn decode(text: &str) -> Option<f64> {
    text.match_indices('[')
        .find_map(|(start, _)| match_tag(&text[start..]).map(|(seconds, _)| seconds))
}

/// Split a line into its leading time tag and the text that follows it.
///
/// Leading whitespace before the tag is ignored. Returns `None` when the
/// line does not start with a well-formed tag.
#[must_use]
pub fn strip_leading_tag(line: &str) -> Option<(f64, &str)> {
    let line = line.trim_start();
    let (seconds, len) = match_tag(line)?;
    Some((seconds, &line[len..]))
}

/// Match a tag at the very start of `s`, returning the time and the byte
/// length of the tag.
fn match_tag(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }

    let minutes = parse_digits(bytes.get(1..3)?)?;
    if bytes.get(3) != Some(&b':') {
        return None;
    }
    let seconds = parse_digits(bytes.get(4..6)?)?;
    if bytes.get(6) != Some(&b'.') {
        return None;
    }

    let fraction_digits = bytes
        .get(7..)?
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if !(2..=3).contains(&fraction_digits) {
        return None;
    }
    let close = 7 + fraction_digits;
    if bytes.get(close) != Some(&b']') {
        return None;
    }

    let fraction = parse_digits(bytes.get(7..close)?)?;
    let divisor = if fraction_digits == 3 { 1000.0 } else { 100.0 };
    let total = f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(fraction) / divisor;

    Some((total, close + 1))
}

fn parse_digits(digits: &[u8]) -> Option<u32> {
    digits.iter().try_fold(0_u32, |acc, &b| {
        if b.is_ascii_digit() {
            Some(acc * 10 + u32::from(b - b'0'))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple() {
        assert_eq!(encode(0.0), "[00:00.00]");
        assert_eq!(encode(1.0), "[00:01.00]");
        assert_eq!(encode(3.5), "[00:03.50]");
        assert_eq!(encode(62.25), "[01:02.25]");
    }

    #[test]
    fn test_encode_truncates_without_carry() {
        assert_eq!(encode(59.996), "[00:59.99]");
        assert_eq!(encode(119.999), "[01:59.99]");
    }

    #[test]
    fn test_encode_absorbs_float_representation() {
        assert_eq!(encode(1.15), "[00:01.15]");
        assert_eq!(encode(0.29), "[00:00.29]");
        assert_eq!(encode(2.07), "[00:02.07]");
        assert_eq!(encode(75.42), "[01:15.42]");
    }

    #[test]
    fn test_decoded_tag_encodes_back_unchanged() {
        assert_eq!(decode("[00:01.15]").map(encode).as_deref(), Some("[00:01.15]"));
        for hundredths in 0..=599_999_u32 {
            let tag = format!(
                "[{:02}:{:02}.{:02}]",
                hundredths / 6000,
                hundredths / 100 % 60,
                hundredths % 100
            );
            let encoded = decode(&tag).map(encode);
            assert_eq!(encoded.as_deref(), Some(tag.as_str()), "{tag} drifted");
        }
    }

    #[test]
    fn test_encode_wide_minutes() {
        assert_eq!(encode(6000.0), "[100:00.00]");
    }

    #[test]
    fn test_encode_negative_saturates() {
        assert_eq!(encode(-3.0), "[00:00.00]");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(75.42), "01:15.42");
    }

    #[test]
    fn test_decode_centiseconds() {
        assert_eq!(decode("[01:02.50]"), Some(62.5));
    }

    #[test]
    fn test_decode_milliseconds() {
        assert_eq!(decode("[00:01.500]"), Some(1.5));
        assert_eq!(decode("[00:01.050]"), Some(1.05));
    }

    #[test]
    fn test_decode_inside_text() {
        assert_eq!(decode("chorus [00:03.00] again"), Some(3.0));
        assert_eq!(decode("[ti:Title][00:04.00]"), Some(4.0));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("[00:01.5]"), None);
        assert_eq!(decode("[00:01.5000]"), None);
        assert_eq!(decode("[1:02.50]"), None);
        assert_eq!(decode("[00:01:50]"), None);
        assert_eq!(decode("[00:01.50"), None);
        assert_eq!(decode("[ar:Artist]"), None);
    }

    #[test]
    fn test_strip_leading_tag() {
        assert_eq!(
            strip_leading_tag("  [00:12.34]Hello world"),
            Some((12.34, "Hello world"))
        );
        assert_eq!(strip_leading_tag("[00:12.34]"), Some((12.34, "")));
        assert_eq!(strip_leading_tag("Hello [00:12.34]"), None);
    }

    #[test]
    fn test_roundtrip_within_one_centisecond() {
        for hundredths in (0..=599_999_u32).step_by(137) {
            let t = f64::from(hundredths) / 100.0;
            let decoded = decode(&encode(t)).unwrap_or(f64::NAN);
            assert!(decoded <= t + 1e-9, "{t} decoded above input: {decoded}");
            assert!(t - decoded < 0.01 + 1e-9, "{t} decoded too low: {decoded}");
        }
    }
}
