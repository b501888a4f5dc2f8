//! Pure field extractors over the body of an RTS line
//!
//! Every extractor either returns the typed value or an input error naming the
//! pattern that failed and the text it was applied to.

use lazy_static::lazy_static;
use regex::Regex;
use rts_core::{Error, Result, TimeWindow, Timestamp};
use std::str::FromStr;

lazy_static! {
    static ref FILE_REGEX: Regex = Regex::new(r"\b((?:file|tiered):[^\s,]+)").unwrap();
    static ref POINTER_REGEX: Regex = Regex::new(r"^(?:0[xX])?([0-9a-fA-F]+)\b").unwrap();
    static ref TIMESTAMP_REGEX: Regex = Regex::new(r"^\((\d+),\s*(\d+)\)").unwrap();
    static ref NUMBER_REGEX: Regex = Regex::new(r"^(\d+)\b").unwrap();
    static ref BOOL_REGEX: Regex = Regex::new(r"^(?i)(true|false)\b").unwrap();
    static ref WORD_REGEX: Regex = Regex::new(r"^(\S+)").unwrap();
    /// `time_window=[start: ]DS/S/TXN[ stop: DS/S/TXN]`
    static ref TIME_WINDOW_REGEX: Regex = Regex::new(concat!(
        r"\btime_window=(?:start:\s*)?",
        r"\((\d+),\s*(\d+)\)/\((\d+),\s*(\d+)\)/(\d+)\b",
        r"(?:\s+stop:\s*\((\d+),\s*(\d+)\)/\((\d+),\s*(\d+)\)/(\d+)\b)?",
    ))
    .unwrap();
}

/// Locate the text following `label=`, matching the label only at a token
/// boundary so that `stable_timestamp` never matches inside
/// `restored_stable_timestamp`.
pub fn find_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let needle = format!("{label}=");
    text.match_indices(&needle)
        .find(|(idx, _)| {
            text[..*idx]
                .chars()
                .next_back()
                .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'))
        })
        .map(|(idx, _)| &text[idx + needle.len()..])
}

fn labelled<'a>(text: &'a str, label: &str, shape: &str) -> Result<&'a str> {
    find_value(text, label).ok_or_else(|| {
        Error::malformed(text, format!("{label}={shape}"), format!("missing field '{label}'"))
    })
}

fn parse_number<T: FromStr>(raw: &str, text: &str, pattern: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::malformed(text, pattern, format!("'{raw}' is out of range")))
}

/// The first `file:<name>` or `tiered:<name>` URI in the text
pub fn extract_file(text: &str) -> Result<String> {
    FILE_REGEX
        .captures(text)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| Error::malformed(text, FILE_REGEX.as_str(), "missing file URI"))
}

/// A pointer printed as `<label>=0x<hex>` or `<label>=<hex>`
pub fn extract_pointer(text: &str, label: &str) -> Result<u64> {
    let pattern = format!("{label}=(0x)<hex>");
    let value = labelled(text, label, "(0x)<hex>")?;
    let caps = POINTER_REGEX
        .captures(value)
        .ok_or_else(|| Error::malformed(text, pattern.as_str(), "pointer is not hexadecimal"))?;
    u64::from_str_radix(&caps[1], 16)
        .map_err(|_| Error::malformed(text, pattern.as_str(), "pointer does not fit 64 bits"))
}

/// A timestamp printed as `<prefix>=(S, T)`
pub fn extract_simple_timestamp(text: &str, prefix: &str) -> Result<Timestamp> {
    let pattern = format!("{prefix}=(S, T)");
    let value = labelled(text, prefix, "(S, T)")?;
    let caps = TIMESTAMP_REGEX
        .captures(value)
        .ok_or_else(|| Error::malformed(text, pattern.as_str(), "timestamp is not a pair"))?;
    Ok(Timestamp::new(
        parse_number(&caps[1], text, &pattern)?,
        parse_number(&caps[2], text, &pattern)?,
    ))
}

/// The integer captured by the first group of `pattern`
pub fn extract_int<T: FromStr>(text: &str, pattern: &Regex) -> Result<T> {
    let caps = pattern
        .captures(text)
        .ok_or_else(|| Error::malformed(text, pattern.as_str(), "pattern did not match"))?;
    parse_number(&caps[1], text, pattern.as_str())
}

/// An unsigned integer printed as `<label>=N`
pub fn extract_number(text: &str, label: &str) -> Result<u64> {
    let pattern = format!("{label}=N");
    let value = labelled(text, label, "N")?;
    let caps = NUMBER_REGEX
        .captures(value)
        .ok_or_else(|| Error::malformed(text, pattern.as_str(), "value is not a number"))?;
    parse_number(&caps[1], text, &pattern)
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// The case-insensitive `true`/`false` captured by the first group of `pattern`
pub fn extract_bool(text: &str, pattern: &Regex) -> Result<bool> {
    let caps = pattern
        .captures(text)
        .ok_or_else(|| Error::malformed(text, pattern.as_str(), "pattern did not match"))?;
    parse_bool(&caps[1]).ok_or_else(|| {
        Error::malformed(
            text,
            pattern.as_str(),
            format!("'{}' is not a boolean", &caps[1]),
        )
    })
}

/// A boolean printed as `<label>=true|false`
pub fn extract_flag(text: &str, label: &str) -> Result<bool> {
    let value = labelled(text, label, "true|false")?;
    BOOL_REGEX
        .captures(value)
        .and_then(|caps| parse_bool(&caps[1]))
        .ok_or_else(|| {
            Error::malformed(
                text,
                format!("{label}=true|false"),
                format!("field '{label}' is not a boolean"),
            )
        })
}

/// The whitespace-delimited token following `<label>=`
pub fn extract_word<'a>(text: &'a str, label: &str) -> Result<&'a str> {
    let value = labelled(text, label, "<token>")?;
    WORD_REGEX
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            Error::malformed(text, format!("{label}=<token>"), format!("field '{label}' is empty"))
        })
}

/// A value parsed from the token following `<label>=`
pub fn extract_parsed<T>(text: &str, label: &str) -> Result<T>
where
    T: FromStr<Err = String>,
{
    let word = extract_word(text, label)?;
    word.parse()
        .map_err(|message: String| Error::malformed(text, format!("{label}=<token>"), message))
}

fn window_side(caps: &regex::Captures<'_>, first: usize, text: &str) -> Result<(Timestamp, Timestamp, u64)> {
    let pattern = TIME_WINDOW_REGEX.as_str();
    let field = |i: usize| -> Result<u64> {
        let raw = caps
            .get(first + i)
            .map(|m| m.as_str())
            .ok_or_else(|| Error::malformed(text, pattern, "incomplete time window"))?;
        parse_number(raw, text, pattern)
    };
    Ok((
        Timestamp::new(field(0)?, field(1)?),
        Timestamp::new(field(2)?, field(3)?),
        field(4)?,
    ))
}

/// The start half of a time window: `(durable_start, start, start_txn)`
pub fn extract_start_window(text: &str) -> Result<(Timestamp, Timestamp, u64)> {
    let caps = TIME_WINDOW_REGEX.captures(text).ok_or_else(|| {
        Error::malformed(text, TIME_WINDOW_REGEX.as_str(), "missing time window")
    })?;
    window_side(&caps, 1, text)
}

/// A complete time window with both the start and the stop half
pub fn extract_time_window(text: &str) -> Result<TimeWindow> {
    let caps = TIME_WINDOW_REGEX.captures(text).ok_or_else(|| {
        Error::malformed(text, TIME_WINDOW_REGEX.as_str(), "missing time window")
    })?;
    if caps.get(6).is_none() {
        return Err(Error::malformed(
            text,
            TIME_WINDOW_REGEX.as_str(),
            "time window has no stop half",
        ));
    }
    let (durable_start, start, start_txn) = window_side(&caps, 1, text)?;
    let (durable_stop, stop, stop_txn) = window_side(&caps, 6, text)?;
    Ok(TimeWindow {
        durable_start,
        start,
        start_txn,
        durable_stop,
        stop,
        stop_txn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_accepts_both_uri_schemes() {
        assert_eq!(extract_file("file:foo.wt modified=true").unwrap(), "file:foo.wt");
        assert_eq!(extract_file("x tiered:bar-0001.wtobj, y").unwrap(), "tiered:bar-0001.wtobj");
        assert!(extract_file("modified=true").is_err());
    }

    #[test]
    fn test_file_ignores_words_ending_in_file() {
        assert_eq!(extract_file("profile:x file:a.wt").unwrap(), "file:a.wt");
    }

    #[test]
    fn test_pointer_accepts_prefixed_and_bare_hex() {
        assert_eq!(extract_pointer("addr=0x7f3a10 modified=true", "addr").unwrap(), 0x7f3a10);
        assert_eq!(extract_pointer("addr=00007FF6A3B0", "addr").unwrap(), 0x7ff6a3b0);
        assert!(extract_pointer("addr=zz", "addr").is_err());
        assert!(extract_pointer("ref=0x10", "addr").is_err());
    }

    #[test]
    fn test_pointer_rejects_trailing_garbage() {
        assert!(extract_pointer("addr=0xzz modified=true", "addr").is_err());
        assert!(extract_pointer("addr=0x", "addr").is_err());
        assert!(extract_pointer("addr=0x10zz modified=true", "addr").is_err());
        assert_eq!(extract_pointer("addr=0x10, modified=true", "addr").unwrap(), 0x10);
    }

    #[test]
    fn test_number_rejects_trailing_garbage() {
        assert!(extract_number("txnid=12abc", "txnid").is_err());
        assert!(extract_number("snapshot_count=10zz", "snapshot_count").is_err());
        assert_eq!(extract_number("txnid=12, id=3", "txnid").unwrap(), 12);
    }

    #[test]
    fn test_timestamp_label_matches_on_token_boundary() {
        let text = "restored_stable_timestamp=(9, 9) stable_timestamp=(5, 1)";
        assert_eq!(
            extract_simple_timestamp(text, "stable_timestamp").unwrap(),
            Timestamp::new(5, 1)
        );
        assert!(extract_simple_timestamp("restored_stable_timestamp=(9, 9)", "stable_timestamp").is_err());
    }

    #[test]
    fn test_missing_field_reports_pattern_and_text() {
        let err = extract_simple_timestamp("oldest_timestamp=(1, 0)", "stable_timestamp").unwrap_err();
        match err {
            Error::MalformedInput { pattern, line, .. } => {
                assert_eq!(pattern, "stable_timestamp=(S, T)");
                assert_eq!(line, "oldest_timestamp=(1, 0)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_booleans_are_case_insensitive() {
        assert!(extract_flag("modified=TRUE", "modified").unwrap());
        assert!(!extract_flag("modified=False", "modified").unwrap());
        assert!(extract_flag("modified=maybe", "modified").is_err());

        let pattern = Regex::new(r"needs_abort:\s*(\w+)").unwrap();
        assert!(extract_bool("needs_abort: True", &pattern).unwrap());
        assert!(extract_bool("needs_abort: 1", &pattern).is_err());
    }

    #[test]
    fn test_int_uses_first_capture_group() {
        let pattern = Regex::new(r"\btxnid=(\d+)\b").unwrap();
        assert_eq!(extract_int::<u64>("start_txnid=4 txnid=18", &pattern).unwrap(), 18);
        assert!(extract_int::<u64>("start_txnid=4", &pattern).is_err());
        assert!(extract_int::<u64>("txnid=12abc", &pattern).is_err());
        assert_eq!(extract_number("snapshot_count=3", "snapshot_count").unwrap(), 3);
    }

    #[test]
    fn test_full_time_window() {
        let tw = extract_time_window(
            "file:foo.wt time_window=start: (8, 0)/(7, 0)/1 stop: (6, 0)/(5, 0)/2 type=STANDARD",
        )
        .unwrap();
        assert_eq!(tw.durable_start, Timestamp::new(8, 0));
        assert_eq!(tw.start, Timestamp::new(7, 0));
        assert_eq!(tw.start_txn, 1);
        assert_eq!(tw.durable_stop, Timestamp::new(6, 0));
        assert_eq!(tw.stop, Timestamp::new(5, 0));
        assert_eq!(tw.stop_txn, 2);
    }

    #[test]
    fn test_start_only_time_window() {
        let (durable, start, txn) =
            extract_start_window("file:foo.wt time_window=(3, 1)/(3, 0)/12 durable_timestamp > stable_timestamp: false")
                .unwrap();
        assert_eq!(durable, Timestamp::new(3, 1));
        assert_eq!(start, Timestamp::new(3, 0));
        assert_eq!(txn, 12);
        assert!(extract_time_window("time_window=(3, 1)/(3, 0)/12").is_err());
    }

    #[test]
    fn test_words_and_parsed_tokens() {
        assert_eq!(extract_word("key=abc123 tombstone=true", "key").unwrap(), "abc123");
        let state: rts_core::PrepareState =
            extract_parsed("prepare_state=PREPARE_LOCKED", "prepare_state").unwrap();
        assert_eq!(state, rts_core::PrepareState::Locked);
        assert!(extract_parsed::<rts_core::UpdateType>("type=DELTA", "type").is_err());
    }
}
