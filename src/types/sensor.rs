// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor telemetry types.

use std::fmt;

use serde::Serialize;

/// A sensor group the controller reports under its own data key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Temperature probes.
    Temperature,
    /// Fan tachometers.
    Fan,
    /// Voltage probes.
    Voltage,
}

impl SensorKind {
    /// Every sensor group, in the order [`SensorData`] lists them.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Fan, Self::Voltage];

    /// Returns the data key used to query this group.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Temperature => "temperatures",
            Self::Fan => "fans",
            Self::Voltage => "voltages",
        }
    }

    /// Returns the unit assumed when a reading does not name one.
    #[must_use]
    pub const fn default_unit(&self) -> &'static str {
        match self {
            Self::Temperature => "C",
            Self::Fan => "RPM",
            Self::Voltage => "V",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single sensor value.
///
/// Readings are produced fresh by every decode and never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Sensor name, e.g. `Inlet Temp`.
    pub name: String,
    /// Current reading; 0 when the controller reported nothing usable.
    pub value: f64,
    /// Unit of `value` and the thresholds.
    pub unit: String,
    /// Health status as reported, e.g. `ok`.
    pub status: String,
    /// Warning threshold, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<f64>,
    /// Critical threshold, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_threshold: Option<f64>,
}

impl SensorReading {
    /// Status assumed when a reading carries none.
    pub const DEFAULT_STATUS: &'static str = "ok";

    /// Creates a reading with default status and no thresholds.
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            status: Self::DEFAULT_STATUS.to_string(),
            warning_threshold: None,
            critical_threshold: None,
        }
    }
}

/// All sensor readings grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    /// Temperature readings.
    pub temperatures: Vec<SensorReading>,
    /// Fan readings.
    pub fans: Vec<SensorReading>,
    /// Voltage readings.
    pub voltages: Vec<SensorReading>,
}

impl SensorData {
    /// Returns the readings of one group.
    #[must_use]
    pub fn group(&self, kind: SensorKind) -> &[SensorReading] {
        match kind {
            SensorKind::Temperature => &self.temperatures,
            SensorKind::Fan => &self.fans,
            SensorKind::Voltage => &self.voltages,
        }
    }

    pub(crate) fn set_group(&mut self, kind: SensorKind, readings: Vec<SensorReading>) {
        match kind {
            SensorKind::Temperature => self.temperatures = readings,
            SensorKind::Fan => self.fans = readings,
            SensorKind::Voltage => self.voltages = readings,
        }
    }

    /// Returns true when no group holds any reading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty() && self.fans.is_empty() && self.voltages.is_empty()
    }
}
