// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! System event log types.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Timestamp layouts seen in event log entries.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// One entry of the system event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogEntry {
    /// Record identifier as reported by the controller.
    pub id: String,
    /// Timestamp text as reported; not normalized.
    pub timestamp: String,
    /// Severity text, e.g. `Normal`, `Warning`, `Critical`.
    pub severity: String,
    /// Human-readable description.
    pub description: String,
    /// Entity the event refers to, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl EventLogEntry {
    /// Identifier given to lines that matched no known layout.
    pub const SYNTHETIC_ID: &'static str = "0";
    /// Severity given to lines that matched no known layout.
    pub const UNKNOWN_SEVERITY: &'static str = "Unknown";

    /// Parses the timestamp if it is in one of the common layouts.
    ///
    /// # Examples
    ///
    /// ```
    /// use idrac_lib::types::EventLogEntry;
    ///
    /// let entry = EventLogEntry {
    ///     timestamp: "2024-01-01 12:00:00".to_string(),
    ///     ..EventLogEntry::default()
    /// };
    /// assert!(entry.parsed_timestamp().is_some());
    /// ```
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }
}

/// The system event log in controller order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLog {
    /// Entries as returned; never re-sorted or deduplicated.
    pub entries: Vec<EventLogEntry>,
    /// Number of entries.
    pub total_count: usize,
}

impl From<Vec<EventLogEntry>> for EventLog {
    fn from(entries: Vec<EventLogEntry>) -> Self {
        let total_count = entries.len();
        Self {
            entries,
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn entry_at(timestamp: &str) -> EventLogEntry {
        EventLogEntry {
            timestamp: timestamp.to_string(),
            ..EventLogEntry::default()
        }
    }

    #[test]
    fn parses_space_separated_timestamp() {
        let ts = entry_at("2024-06-15 10:30:00").parsed_timestamp().unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn parses_iso_timestamp() {
        assert!(entry_at("2024-06-15T10:30:00").parsed_timestamp().is_some());
    }

    #[test]
    fn unparseable_timestamp_is_none() {
        assert!(entry_at("").parsed_timestamp().is_none());
        assert!(entry_at("yesterday").parsed_timestamp().is_none());
    }

    #[test]
    fn event_log_counts_entries() {
        let log = EventLog::from(vec![EventLogEntry::default(), EventLogEntry::default()]);
        assert_eq!(log.total_count, 2);
    }
}
