// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! System event log decoding.

use crate::error::ParseError;
use crate::response::XmlElement;
use crate::response::strategy::{DecodeStrategy, decode_first};
use crate::types::{EventLog, EventLogEntry};

/// Data key of the event log.
const FIELD: &str = "sel";

/// Delimiters of the four-field line layouts, in the order they are tried.
const LINE_DELIMITERS: [char; 2] = ['|', ';'];

const ID_FIELDS: [&str; 2] = ["id", "recordId"];
const TIMESTAMP_FIELDS: [&str; 3] = ["dateTime", "timestamp", "time"];
const SEVERITY_FIELDS: [&str; 1] = ["severity"];
const DESCRIPTION_FIELDS: [&str; 3] = ["description", "message", "desc"];
const ENTITY_FIELDS: [&str; 2] = ["entity", "sensor"];

/// Decodes the event log from a response body.
///
/// Structured `<record>` elements are preferred; otherwise the text of the
/// `sel` element is read line by line, and failing that each childless
/// element is read as one line.
///
/// # Errors
///
/// Returns `ParseError` only if the body is not XML.
pub fn decode_event_log(body: &str) -> Result<EventLog, ParseError> {
    let root = XmlElement::parse(body)?;
    let entries = decode_first(
        root.find(FIELD),
        &[&StructuredEvents, &LineEvents, &LeafEventLines],
    );
    Ok(EventLog::from(entries))
}

struct StructuredEvents;

impl DecodeStrategy<EventLogEntry> for StructuredEvents {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn decode(&self, field: &XmlElement) -> Option<Vec<EventLogEntry>> {
        let entries: Vec<EventLogEntry> = field
            .children()
            .iter()
            .filter(|record| record.has_children())
            .filter_map(entry_from_record)
            .collect();
        (!entries.is_empty()).then_some(entries)
    }
}

fn entry_from_record(record: &XmlElement) -> Option<EventLogEntry> {
    let description = record.field(&DESCRIPTION_FIELDS).unwrap_or_default();
    let id = match record.field(&ID_FIELDS) {
        Some(id) => id,
        None if !description.is_empty() => EventLogEntry::SYNTHETIC_ID,
        None => return None,
    };
    Some(EventLogEntry {
        id: id.to_string(),
        timestamp: record.field(&TIMESTAMP_FIELDS).unwrap_or_default().to_string(),
        severity: record
            .field(&SEVERITY_FIELDS)
            .unwrap_or(EventLogEntry::UNKNOWN_SEVERITY)
            .to_string(),
        description: description.to_string(),
        entity: record.field(&ENTITY_FIELDS).map(str::to_string),
    })
}

struct LineEvents;

impl DecodeStrategy<EventLogEntry> for LineEvents {
    fn name(&self) -> &'static str {
        "lines"
    }

    fn decode(&self, field: &XmlElement) -> Option<Vec<EventLogEntry>> {
        let entries = parse_event_lines(field.text());
        (!entries.is_empty()).then_some(entries)
    }
}

/// One line per element: `<sel><entry>1|…|…|…</entry></sel>`.
struct LeafEventLines;

impl DecodeStrategy<EventLogEntry> for LeafEventLines {
    fn name(&self) -> &'static str {
        "leaf-lines"
    }

    fn decode(&self, field: &XmlElement) -> Option<Vec<EventLogEntry>> {
        let entries: Vec<EventLogEntry> = field
            .children()
            .iter()
            .filter(|entry| !entry.has_children())
            .flat_map(|entry| parse_event_lines(entry.text()))
            .collect();
        (!entries.is_empty()).then_some(entries)
    }
}

/// Parses a newline-separated event log blob.
///
/// Blank lines and lines that end up without an identifier contribute no
/// entry. Order is preserved.
///
/// # Examples
///
/// ```
/// use idrac_lib::response::parse_event_lines;
///
/// let entries = parse_event_lines(
///     "1|2024-01-01 12:00:00|Normal|System Boot\n\n2|2024-01-01 12:05:00|Warning|Temp high",
/// );
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[1].severity, "Warning");
/// ```
#[must_use]
pub fn parse_event_lines(raw: &str) -> Vec<EventLogEntry> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_event_line)
        .filter(|entry| !entry.id.is_empty())
        .collect()
}

/// Parses a single event log line.
///
/// The line is tried as `id|timestamp|severity|description`, then as the
/// same layout with `;`. A line matching neither becomes the description of
/// an entry with a synthetic id and unknown severity.
///
/// # Examples
///
/// ```
/// use idrac_lib::response::parse_event_line;
/// use idrac_lib::types::EventLogEntry;
///
/// let entry = parse_event_line("7;2024-06-15;Critical;PSU failure");
/// assert_eq!(entry.id, "7");
/// assert_eq!(entry.description, "PSU failure");
///
/// let entry = parse_event_line("raw event text");
/// assert_eq!(entry.id, EventLogEntry::SYNTHETIC_ID);
/// assert_eq!(entry.severity, EventLogEntry::UNKNOWN_SEVERITY);
/// ```
#[must_use]
pub fn parse_event_line(line: &str) -> EventLogEntry {
    for delimiter in LINE_DELIMITERS {
        let parts: Vec<&str> = line.splitn(4, delimiter).map(str::trim).collect();
        if let &[id, timestamp, severity, description] = parts.as_slice() {
            return EventLogEntry {
                id: id.to_string(),
                timestamp: timestamp.to_string(),
                severity: severity.to_string(),
                description: description.to_string(),
                entity: None,
            };
        }
    }

    EventLogEntry {
        id: EventLogEntry::SYNTHETIC_ID.to_string(),
        timestamp: String::new(),
        severity: EventLogEntry::UNKNOWN_SEVERITY.to_string(),
        description: line.trim().to_string(),
        entity: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_lines_preserve_order() {
        let entries = parse_event_lines(
            "1|2024-01-01 12:00:00|Normal|System Boot\n2|2024-01-01 12:05:00|Warning|Temperature above threshold",
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "1");
        assert_eq!(entries[0].description, "System Boot");
        assert_eq!(entries[1].id, "2");
        assert_eq!(entries[1].timestamp, "2024-01-01 12:05:00");
    }

    #[test]
    fn description_keeps_extra_delimiters() {
        let entry = parse_event_line("3|2024-01-01|Normal|Fan 1|redundancy restored");
        assert_eq!(entry.description, "Fan 1|redundancy restored");
    }

    #[test]
    fn semicolon_line() {
        let entry = parse_event_line("7;2024-06-15;Critical;PSU failure");
        assert_eq!(entry.id, "7");
        assert_eq!(entry.severity, "Critical");
        assert_eq!(entry.description, "PSU failure");
    }

    #[test]
    fn three_pipe_fields_fall_back_to_description() {
        let entry = parse_event_line("1|2024-01-01|Normal");
        assert_eq!(entry.id, "0");
        assert_eq!(entry.description, "1|2024-01-01|Normal");
    }

    #[test]
    fn undelimited_line_gets_synthetic_id() {
        let entries = parse_event_lines("Unknown event data");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "0");
        assert_eq!(entries[0].severity, "Unknown");
        assert_eq!(entries[0].description, "Unknown event data");
    }

    #[test]
    fn blank_lines_and_empty_ids_are_dropped() {
        assert!(parse_event_lines("").is_empty());
        assert!(parse_event_lines("\n  \r\n").is_empty());
        let entries = parse_event_lines("|2024-01-01|Normal|orphan\n5|2024-01-01|Normal|kept");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "5");
    }

    #[test]
    fn decodes_line_blob() {
        let body = "<root><sel>1|2024-01-01 12:00:00|Normal|Boot\n2|2024-01-01 12:05:00|Warning|Temp high</sel></root>";
        let log = decode_event_log(body).unwrap();
        assert_eq!(log.total_count, 2);
        assert_eq!(log.entries[0].description, "Boot");
    }

    #[test]
    fn decodes_structured_records() {
        let body = "<root><sel>
            <record><id>12</id><dateTime>2024-03-01 08:00:00</dateTime><severity>Critical</severity><description>PS2 lost</description><entity>PS2 Status</entity></record>
            <record><description>no id</description></record>
            <record><severity>Normal</severity></record>
        </sel></root>";
        let log = decode_event_log(body).unwrap();
        assert_eq!(log.total_count, 2);
        assert_eq!(log.entries[0].id, "12");
        assert_eq!(log.entries[0].entity.as_deref(), Some("PS2 Status"));
        assert_eq!(log.entries[1].id, EventLogEntry::SYNTHETIC_ID);
        assert_eq!(log.entries[1].severity, EventLogEntry::UNKNOWN_SEVERITY);
    }

    #[test]
    fn decodes_leaf_entries() {
        let body = "<root><sel>
            <entry>1|2024-01-01 12:00:00|Normal|System Boot</entry>
            <entry></entry>
            <entry>2;2024-01-01 12:05:00;Warning;Temp high</entry>
        </sel></root>";
        let log = decode_event_log(body).unwrap();
        assert_eq!(log.total_count, 2);
        assert_eq!(log.entries[0].id, "1");
        assert_eq!(log.entries[1].severity, "Warning");
        assert_eq!(log.entries[1].description, "Temp high");
    }

    #[test]
    fn missing_field_is_empty_log() {
        let log = decode_event_log("<root></root>").unwrap();
        assert_eq!(log.total_count, 0);
        assert!(log.entries.is_empty());
    }
}
