//! Transaction-level enumerations that appear in RTS log lines

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Two-phase-commit state of the transaction owning an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrepareState {
    #[serde(rename = "PREPARE_INIT")]
    Init,
    #[serde(rename = "PREPARE_INPROGRESS")]
    InProgress,
    #[serde(rename = "PREPARE_LOCKED")]
    Locked,
    #[serde(rename = "PREPARE_RESOLVED")]
    Resolved,
}

impl PrepareState {
    pub const ALL: [PrepareState; 4] = [
        PrepareState::Init,
        PrepareState::InProgress,
        PrepareState::Locked,
        PrepareState::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrepareState::Init => "PREPARE_INIT",
            PrepareState::InProgress => "PREPARE_INPROGRESS",
            PrepareState::Locked => "PREPARE_LOCKED",
            PrepareState::Resolved => "PREPARE_RESOLVED",
        }
    }

    /// Whether the owning transaction is prepared but not yet resolved
    pub fn is_unresolved(&self) -> bool {
        matches!(self, PrepareState::InProgress | PrepareState::Locked)
    }
}

impl Display for PrepareState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrepareState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("WT_").unwrap_or(&upper);
        // The engine stores the state as a small integer; older builds log it raw.
        match name {
            "PREPARE_INIT" | "0" => Ok(PrepareState::Init),
            "PREPARE_INPROGRESS" | "1" => Ok(PrepareState::InProgress),
            "PREPARE_LOCKED" | "2" => Ok(PrepareState::Locked),
            "PREPARE_RESOLVED" | "3" => Ok(PrepareState::Resolved),
            _ => Err(format!("unknown prepare state '{s}'")),
        }
    }
}

/// Kind of a stored update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateType {
    Standard,
    Modify,
    Tombstone,
    Reserve,
    Birthmark,
}

impl UpdateType {
    pub const ALL: [UpdateType; 5] = [
        UpdateType::Standard,
        UpdateType::Modify,
        UpdateType::Tombstone,
        UpdateType::Reserve,
        UpdateType::Birthmark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::Standard => "STANDARD",
            UpdateType::Modify => "MODIFY",
            UpdateType::Tombstone => "TOMBSTONE",
            UpdateType::Reserve => "RESERVE",
            UpdateType::Birthmark => "BIRTHMARK",
        }
    }
}

impl Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("WT_UPDATE_").unwrap_or(&upper);
        match name {
            "STANDARD" => Ok(UpdateType::Standard),
            "MODIFY" => Ok(UpdateType::Modify),
            "TOMBSTONE" => Ok(UpdateType::Tombstone),
            "RESERVE" => Ok(UpdateType::Reserve),
            "BIRTHMARK" => Ok(UpdateType::Birthmark),
            _ => Err(format!("unknown update type '{s}'")),
        }
    }
}
