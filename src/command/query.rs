// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data queries.

use crate::command::Command;
use crate::types::SensorKind;

/// Keys requested for the system identity.
pub(crate) const IDENTITY_KEYS: [&str; 8] = [
    "hostName",
    "sysDesc",
    "sysRev",
    "biosVer",
    "fwVersion",
    "LCCfwVersion",
    "osName",
    "svcTag",
];

/// Reads one or more named data keys in a single request.
///
/// Keys are joined with commas and sent unencoded, which is what the
/// controller expects.
///
/// # Examples
///
/// ```
/// use idrac_lib::command::{Command, QueryCommand};
///
/// let query = QueryCommand::new(["temperatures", "fans"]);
/// assert_eq!(query.to_query_string(), "get=temperatures,fans");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCommand {
    keys: Vec<String>,
}

impl QueryCommand {
    /// Creates a query for the given keys.
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Queries the power state.
    #[must_use]
    pub fn power_state() -> Self {
        Self::new(["pwState"])
    }

    /// Queries one sensor group.
    #[must_use]
    pub fn sensors(kind: SensorKind) -> Self {
        Self::new([kind.key()])
    }

    /// Queries every field of the system identity.
    #[must_use]
    pub fn system_identity() -> Self {
        Self::new(IDENTITY_KEYS)
    }

    /// Queries the system event log.
    #[must_use]
    pub fn event_log() -> Self {
        Self::new(["sel"])
    }

    /// Returns the requested keys.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl Command for QueryCommand {
    fn describe(&self) -> String {
        format!("get {}", self.keys.join(","))
    }

    fn to_query_string(&self) -> String {
        format!("get={}", self.keys.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_queries_use_group_keys() {
        assert_eq!(
            QueryCommand::sensors(SensorKind::Voltage).to_query_string(),
            "get=voltages"
        );
    }

    #[test]
    fn identity_query_lists_all_keys() {
        assert_eq!(
            QueryCommand::system_identity().to_query_string(),
            "get=hostName,sysDesc,sysRev,biosVer,fwVersion,LCCfwVersion,osName,svcTag"
        );
    }

    #[test]
    fn describe_names_keys() {
        assert_eq!(QueryCommand::power_state().describe(), "get pwState");
    }
}
