// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor group decoding.
//!
//! Three encodings of a sensor group are understood, tried in this order:
//!
//! 1. Structured records, one element per sensor with named sub-fields:
//!    `<temperatures><sensor><name>Inlet Temp</name><reading>23</reading>...</sensor></temperatures>`
//! 2. Flat text, every sensor packed in the group element's text:
//!    `<temperatures>Inlet Temp=23;ok;42;47|Exhaust Temp=35;ok;70;75</temperatures>`
//! 3. Leaf entries, one flat entry per child element:
//!    `<fans><fan>Fan1=5400;ok</fan><fan>Fan2=5280;ok</fan></fans>`

use crate::error::ParseError;
use crate::response::strategy::{DecodeStrategy, decode_first};
use crate::response::{XmlElement, parse_numeric};
use crate::types::{SensorKind, SensorReading};

const NAME_FIELDS: [&str; 4] = ["name", "sensorName", "probeName", "label"];
const VALUE_FIELDS: [&str; 3] = ["reading", "value", "currentReading"];
const STATUS_FIELDS: [&str; 3] = ["status", "sensorStatus", "health"];
const UNIT_FIELDS: [&str; 2] = ["units", "unit"];
const WARNING_FIELDS: [&str; 3] = ["warningThreshold", "upperWarning", "warning"];
const CRITICAL_FIELDS: [&str; 3] = ["criticalThreshold", "upperCritical", "critical"];

/// Decodes one sensor group from a response body.
///
/// # Errors
///
/// Returns `ParseError` only if the body is not XML. A missing or
/// unrecognized group decodes to an empty list.
pub fn decode_sensor_group(body: &str, kind: SensorKind) -> Result<Vec<SensorReading>, ParseError> {
    let root = XmlElement::parse(body)?;
    Ok(decode_first(
        root.find(kind.key()),
        &[
            &StructuredSensors { kind },
            &FlatTextSensors { kind },
            &LeafEntrySensors { kind },
        ],
    ))
}

struct StructuredSensors {
    kind: SensorKind,
}

impl DecodeStrategy<SensorReading> for StructuredSensors {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn decode(&self, field: &XmlElement) -> Option<Vec<SensorReading>> {
        let readings: Vec<SensorReading> = field
            .children()
            .iter()
            .filter(|record| record.has_children() || record.field(&NAME_FIELDS).is_some())
            .filter_map(|record| self.reading_from(record))
            .collect();
        (!readings.is_empty()).then_some(readings)
    }
}

impl StructuredSensors {
    fn reading_from(&self, record: &XmlElement) -> Option<SensorReading> {
        let name = record.field(&NAME_FIELDS)?;
        let mut reading = SensorReading::new(
            name,
            record.field(&VALUE_FIELDS).map_or(0.0, parse_numeric),
            record
                .field(&UNIT_FIELDS)
                .unwrap_or(self.kind.default_unit()),
        );
        if let Some(status) = record.field(&STATUS_FIELDS) {
            reading.status = status.to_string();
        }
        reading.warning_threshold = record.field(&WARNING_FIELDS).map(parse_numeric);
        reading.critical_threshold = record.field(&CRITICAL_FIELDS).map(parse_numeric);
        Some(reading)
    }
}

struct FlatTextSensors {
    kind: SensorKind,
}

impl DecodeStrategy<SensorReading> for FlatTextSensors {
    fn name(&self) -> &'static str {
        "flat-text"
    }

    fn decode(&self, field: &XmlElement) -> Option<Vec<SensorReading>> {
        let readings = parse_flat_sensors(field.text(), self.kind);
        (!readings.is_empty()).then_some(readings)
    }
}

struct LeafEntrySensors {
    kind: SensorKind,
}

impl DecodeStrategy<SensorReading> for LeafEntrySensors {
    fn name(&self) -> &'static str {
        "leaf-entries"
    }

    fn decode(&self, field: &XmlElement) -> Option<Vec<SensorReading>> {
        let readings: Vec<SensorReading> = field
            .children()
            .iter()
            .filter(|entry| !entry.has_children())
            .filter_map(|entry| parse_sensor_entry(entry.text(), self.kind.default_unit()))
            .collect();
        (!readings.is_empty()).then_some(readings)
    }
}

/// Parses a flat-text sensor list.
///
/// Entries are split on `|` if present, else on newlines, else the whole
/// string is one entry. Entries without a name are dropped.
///
/// # Examples
///
/// ```
/// use idrac_lib::response::parse_flat_sensors;
/// use idrac_lib::types::SensorKind;
///
/// let readings = parse_flat_sensors("Fan1=5400;ok\nFan2=5280;ok", SensorKind::Fan);
/// assert_eq!(readings.len(), 2);
/// assert_eq!(readings[1].unit, "RPM");
///
/// assert!(parse_flat_sensors("", SensorKind::Fan).is_empty());
/// ```
#[must_use]
pub fn parse_flat_sensors(raw: &str, kind: SensorKind) -> Vec<SensorReading> {
    split_entries(raw)
        .into_iter()
        .filter_map(|entry| parse_sensor_entry(entry, kind.default_unit()))
        .collect()
}

fn split_entries(raw: &str) -> Vec<&str> {
    let raw = raw.trim();
    if raw.is_empty() {
        Vec::new()
    } else if raw.contains('|') {
        raw.split('|').collect()
    } else if raw.contains('\n') {
        raw.split('\n').collect()
    } else {
        vec![raw]
    }
}

/// Parses one `name=value;status;warning;critical` entry.
///
/// Trailing fields are optional and keep their defaults when absent. An
/// entry without `=` is taken as a bare name with value 0. Returns `None`
/// for an entry with no name.
///
/// # Examples
///
/// ```
/// use idrac_lib::response::parse_sensor_entry;
///
/// let reading = parse_sensor_entry("Inlet Temp=23;ok;42;47", "C").unwrap();
/// assert_eq!(reading.name, "Inlet Temp");
/// assert_eq!(reading.value, 23.0);
/// assert_eq!(reading.status, "ok");
/// assert_eq!(reading.warning_threshold, Some(42.0));
/// assert_eq!(reading.critical_threshold, Some(47.0));
/// ```
#[must_use]
pub fn parse_sensor_entry(entry: &str, unit: &str) -> Option<SensorReading> {
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }

    let Some((name, rest)) = entry.split_once('=') else {
        return Some(SensorReading::new(entry, 0.0, unit));
    };

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut fields = rest.split(';');
    let mut reading = SensorReading::new(name, fields.next().map_or(0.0, parse_numeric), unit);
    if let Some(status) = fields.next().map(str::trim).filter(|s| !s.is_empty()) {
        reading.status = status.to_string();
    }
    reading.warning_threshold = fields.next().map(parse_numeric);
    reading.critical_threshold = fields.next().map(parse_numeric);
    Some(reading)
}
