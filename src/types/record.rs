//! The history record: one observed shell command execution.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};

/// One command execution as stored in a history stream.
///
/// Serialized as a single JSON object with `Timestamp`, `Cmd`, `SessionId`,
/// `Hostname` and `ExitCode` fields. The three trailing fields default to
/// their zero values when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    /// When the command ran. The offset is whatever the appender saw locally.
    pub timestamp: DateTime<FixedOffset>,

    /// Raw command text, whitespace-trimmed by the appender.
    #[serde(rename = "Cmd")]
    pub command: String,

    /// Originating shell session; may be empty.
    #[serde(default)]
    pub session_id: String,

    /// Originating host; may be empty.
    #[serde(default)]
    pub hostname: String,

    /// 0 on success (or when unknown), nonzero on failure.
    #[serde(default)]
    pub exit_code: i64,
}

impl Record {
    /// Creates a record with empty session, empty hostname and exit code 0.
    pub fn new(timestamp: DateTime<FixedOffset>, command: impl Into<String>) -> Self {
        Record {
            timestamp,
            command: command.into(),
            session_id: String::new(),
            hostname: String::new(),
            exit_code: 0,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_exit_code(mut self, exit_code: i64) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Returns true if the command exited successfully.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Seconds since the unix epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// The current local time, truncated to whole seconds.
pub fn now_seconds() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.with_nanosecond(0).unwrap_or(now).fixed_offset()
}

/// Converts unix seconds to a local-offset timestamp.
pub fn timestamp_from_unix(seconds: i64) -> Result<DateTime<FixedOffset>> {
    let utc: DateTime<Utc> = Utc
        .timestamp_opt(seconds, 0)
        .single()
        .ok_or(HistoryError::InvalidTimestamp(seconds))?;
    Ok(utc.with_timezone(&Local).fixed_offset())
}
