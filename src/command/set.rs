// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data commands.

use crate::command::Command;
use crate::types::PowerAction;

/// Writes a single `key:value` pair.
///
/// The whole `key:value` string is percent-encoded as one unit.
///
/// # Examples
///
/// ```
/// use idrac_lib::command::{Command, SetCommand};
///
/// let cmd = SetCommand::new("selClr", "1");
/// assert_eq!(cmd.payload(), "selClr:1");
/// assert_eq!(cmd.to_query_string(), "set=selClr%3A1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCommand {
    key: String,
    value: String,
}

impl SetCommand {
    /// Creates a command setting `key` to `value`.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Executes a power action.
    #[must_use]
    pub fn power(action: PowerAction) -> Self {
        Self::new("pwState", action.code().to_string())
    }

    /// Clears the system event log.
    #[must_use]
    pub fn clear_event_log() -> Self {
        Self::new("selClr", "1")
    }

    /// Returns the unencoded `key:value` payload.
    #[must_use]
    pub fn payload(&self) -> String {
        format!("{}:{}", self.key, self.value)
    }
}

impl Command for SetCommand {
    fn describe(&self) -> String {
        format!("set {}", self.payload())
    }

    fn to_query_string(&self) -> String {
        format!("set={}", urlencoding::encode(&self.payload()))
    }
}
