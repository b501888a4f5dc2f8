//! Engine timestamps as logged by rollback to stable

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// A logged timestamp pair, printed by the engine as `(S, T)`.
///
/// Ordering is lexicographic: `start` first, then `stop`. The zero pair means
/// "not set".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp {
    pub start: u64,
    pub stop: u64,
}

impl Timestamp {
    /// The unset timestamp
    pub const NONE: Timestamp = Timestamp { start: 0, stop: 0 };

    pub const fn new(start: u64, stop: u64) -> Self {
        Self { start, stop }
    }

    /// Whether this timestamp carries a value
    pub fn is_set(&self) -> bool {
        *self != Self::NONE
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.stop)
    }
}

/// Error returned when a string is not of the form `(S, T)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimestampError(String);

impl Display for ParseTimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid timestamp '{}', expected (S, T)", self.0)
    }
}

impl std::error::Error for ParseTimestampError {}

impl FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimestampError(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let (start, stop) = inner.split_once(',').ok_or_else(err)?;
        Ok(Timestamp {
            start: start.trim().parse().map_err(|_| err())?,
            stop: stop.trim().parse().map_err(|_| err())?,
        })
    }
}

/// The start/stop record of an update as printed in `time_window=...`.
///
/// Each side carries its durable timestamp, its commit timestamp and the id
/// of the owning transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub durable_start: Timestamp,
    pub start: Timestamp,
    pub start_txn: u64,
    pub durable_stop: Timestamp,
    pub stop: Timestamp,
    pub stop_txn: u64,
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "start: {}/{}/{} stop: {}/{}/{}",
            self.durable_start, self.start, self.start_txn, self.durable_stop, self.stop, self.stop_txn
        )
    }
}
