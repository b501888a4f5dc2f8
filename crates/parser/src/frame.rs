//! Recognition of RTS-tagged log lines

use lazy_static::lazy_static;
use regex::Regex;
use rts_core::{Error, Result};

lazy_static! {
    /// `[WT_VERB_RTS][DEBUG_1]: ` or the info/notice variants the engine uses
    /// for shutdown messages
    static ref MARKER_REGEX: Regex =
        Regex::new(r"\[WT_VERB_RTS\]\[(DEBUG_\d+|INFO|NOTICE|WARNING|ERROR)\]:\s?").unwrap();
    /// The bracketed event tag opening the body, e.g. `[HS_UPDATE_ABORT]`
    static ref TAG_REGEX: Regex = Regex::new(r"^\s*\[([A-Za-z_]+)\]\s?").unwrap();
}

/// Verbosity level carried by the RTS marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug(u8),
    Info,
    Notice,
    Warning,
    Error,
}

impl Level {
    fn parse(raw: &str) -> Self {
        match raw {
            "INFO" => Level::Info,
            "NOTICE" => Level::Notice,
            "WARNING" => Level::Warning,
            "ERROR" => Level::Error,
            debug => Level::Debug(
                debug
                    .trim_start_matches("DEBUG_")
                    .parse()
                    .unwrap_or(u8::MAX),
            ),
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, Level::Debug(_))
    }
}

/// An RTS line split into its tag and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Lowercase event kind symbol, e.g. `hs_update_abort`
    pub tag: String,
    pub level: Level,
    /// Everything after the bracketed tag
    pub body: &'a str,
    /// The complete input line
    pub line: &'a str,
}

/// Classify one line of the log.
///
/// Returns `Ok(None)` for lines that belong to other subsystems. A debug-level
/// RTS line without a bracketed tag is malformed; untagged info/notice lines
/// are free-form engine messages and are ignored as well.
pub fn classify(line: &str) -> Result<Option<Frame<'_>>> {
    let Some(marker) = MARKER_REGEX.captures(line) else {
        return Ok(None);
    };
    let level = Level::parse(&marker[1]);
    let Some(whole) = marker.get(0) else {
        return Ok(None);
    };
    let rest = &line[whole.end()..];

    match TAG_REGEX.captures(rest) {
        Some(tag) => {
            let tag_end = tag.get(0).map_or(0, |m| m.end());
            Ok(Some(Frame {
                tag: tag[1].to_ascii_lowercase(),
                level,
                body: rest[tag_end..].trim_end(),
                line,
            }))
        }
        None if level.is_debug() => Err(Error::malformed(
            line,
            TAG_REGEX.as_str(),
            "RTS line without a bracketed event tag",
        )),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignores_lines_from_other_subsystems() {
        assert!(classify("[1690:1][42:0x7f], txn-recover: [WT_VERB_RECOVERY][DEBUG_1]: hello")
            .unwrap()
            .is_none());
        assert!(classify("").unwrap().is_none());
    }

    #[test]
    fn test_extracts_lowercase_tag_and_body() {
        let line = "[1690:1][42:0x7f], file:WiredTiger.wt, txn rts: [WT_VERB_RTS][DEBUG_2]: [HS_TREE_SKIP] file:foo.wt durable_timestamp=(1, 0)";
        let frame = classify(line).unwrap().unwrap();
        assert_eq!(frame.tag, "hs_tree_skip");
        assert_eq!(frame.level, Level::Debug(2));
        assert_eq!(frame.body, "file:foo.wt durable_timestamp=(1, 0)");
        assert_eq!(frame.line, line);
    }

    #[test]
    fn test_tag_only_line_has_empty_body() {
        let frame = classify("x [WT_VERB_RTS][DEBUG_1]: [END]").unwrap().unwrap();
        assert_eq!(frame.tag, "end");
        assert_eq!(frame.body, "");
    }

    #[test]
    fn test_untagged_debug_line_is_malformed() {
        let err = classify("x [WT_VERB_RTS][DEBUG_1]: no tag here").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_untagged_notice_line_is_ignored() {
        assert!(classify("x [WT_VERB_RTS][INFO]: skipped shutdown RTS due to disagg")
            .unwrap()
            .is_none());
        let frame = classify("x [WT_VERB_RTS][NOTICE]: [SHUTDOWN_RTS] performing shutdown rollback to stable failed with code 22")
            .unwrap()
            .unwrap();
        assert_eq!(frame.level, Level::Notice);
        assert_eq!(frame.tag, "shutdown_rts");
    }
}
