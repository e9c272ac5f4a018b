// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power-related types.
//!
//! [`PowerState`] is what the controller reports, [`PowerAction`] is what a
//! caller may ask it to do.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValueError;

/// The chassis power state reported by the controller.
///
/// # Examples
///
/// ```
/// use idrac_lib::types::PowerState;
///
/// assert_eq!(PowerState::from_code("0"), PowerState::Off);
/// assert_eq!(PowerState::from_code("1"), PowerState::On);
/// assert_eq!(PowerState::from_code("2"), PowerState::Unknown);
/// assert_eq!(PowerState::On.as_str(), "on");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// The server is powered off.
    Off,
    /// The server is powered on.
    On,
    /// The controller reported something other than 0 or 1.
    Unknown,
}

impl PowerState {
    /// Maps the raw `pwState` value to a state.
    ///
    /// Only `0` and `1` are meaningful; anything else, including an empty
    /// value, is [`PowerState::Unknown`].
    #[must_use]
    pub fn from_code(raw: &str) -> Self {
        match raw.trim() {
            "0" => Self::Off,
            "1" => Self::On,
            _ => Self::Unknown,
        }
    }

    /// Returns the lowercase name of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A power control action accepted by the controller.
///
/// # Examples
///
/// ```
/// use idrac_lib::types::PowerAction;
///
/// let action: PowerAction = "restart".parse().unwrap();
/// assert_eq!(action, PowerAction::Restart);
/// assert_eq!(action.code(), 2);
///
/// assert!("explode".parse::<PowerAction>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    /// Hard power off.
    Off,
    /// Power on.
    On,
    /// Power cycle.
    Restart,
    /// Hard reset.
    Reset,
    /// Non-maskable interrupt.
    Nmi,
    /// Graceful OS shutdown.
    Shutdown,
}

impl PowerAction {
    /// Every supported action, in code order.
    pub const ALL: [Self; 6] = [
        Self::Off,
        Self::On,
        Self::Restart,
        Self::Reset,
        Self::Nmi,
        Self::Shutdown,
    ];

    /// Returns the numeric code sent in the `pwState` command.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Restart => 2,
            Self::Reset => 3,
            Self::Nmi => 4,
            Self::Shutdown => 5,
        }
    }

    /// Returns the action name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Restart => "restart",
            Self::Reset => "reset",
            Self::Nmi => "nmi",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            "restart" => Ok(Self::Restart),
            "reset" => Ok(Self::Reset),
            "nmi" => Ok(Self::Nmi),
            "shutdown" => Ok(Self::Shutdown),
            _ => Err(ValueError::UnknownAction(s.to_string())),
        }
    }
}
