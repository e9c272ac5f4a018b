// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response decoding.
//!
//! Controller firmware revisions disagree on how the same data is encoded.
//! A field may arrive as nested elements, one element per record, or as a
//! single text node packing every record into a delimited string. Each
//! decoder tries an ordered list of [`DecodeStrategy`] implementations and
//! takes the first that yields records.
//!
//! Decoding only fails when the body is not XML at all. Unexpected shapes,
//! missing fields and unparseable numbers degrade to empty or zero values.
//!
//! # Examples
//!
//! ```
//! use idrac_lib::response::decode_sensor_group;
//! use idrac_lib::types::SensorKind;
//!
//! let body = "<root><temperatures>Inlet Temp=23;ok;42;47|Exhaust Temp=35;ok;70;75</temperatures></root>";
//! let readings = decode_sensor_group(body, SensorKind::Temperature).unwrap();
//! assert_eq!(readings.len(), 2);
//! assert_eq!(readings[0].name, "Inlet Temp");
//! assert_eq!(readings[0].critical_threshold, Some(47.0));
//! ```

mod event_log;
mod identity;
mod power;
mod sensors;
mod strategy;
mod xml;

pub use event_log::{decode_event_log, parse_event_line, parse_event_lines};
pub use identity::decode_system_identity;
pub use power::decode_power_state;
pub use sensors::{decode_sensor_group, parse_flat_sensors, parse_sensor_entry};
pub use strategy::{DecodeStrategy, decode_first};
pub use xml::XmlElement;

/// Parses a numeric field permissively.
///
/// Blank text, not-applicable markers and anything else that is not a
/// finite number parse to 0.
///
/// # Examples
///
/// ```
/// use idrac_lib::response::parse_numeric;
///
/// assert_eq!(parse_numeric(" 23.5 "), 23.5);
/// assert_eq!(parse_numeric("N/A"), 0.0);
/// assert_eq!(parse_numeric(""), 0.0);
/// ```
#[must_use]
pub fn parse_numeric(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
