// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller data requests.
//!
//! The controller exposes a single data endpoint that accepts two kinds of
//! request:
//!
//! | Kind | Type | Query string |
//! |------|------|--------------|
//! | Read one or more data keys | [`QueryCommand`] | `get=pwState,sysDesc` |
//! | Write one `key:value` pair | [`SetCommand`] | `set=pwState%3A1` |
//!
//! # Examples
//!
//! ```
//! use idrac_lib::command::{Command, QueryCommand, SetCommand};
//! use idrac_lib::types::PowerAction;
//!
//! let query = QueryCommand::power_state();
//! assert_eq!(query.to_query_string(), "get=pwState");
//!
//! let set = SetCommand::power(PowerAction::On);
//! assert_eq!(set.to_query_string(), "set=pwState%3A1");
//! ```

mod query;
mod set;

pub use query::QueryCommand;
pub use set::SetCommand;

use crate::protocol::{DATA_PATH, HttpRequest};

/// A request against the controller's data endpoint.
pub trait Command {
    /// Short name used in log output, e.g. `get pwState`.
    fn describe(&self) -> String;

    /// Returns the query string, without the leading `?`.
    fn to_query_string(&self) -> String;

    /// Builds the request, without session credentials.
    fn to_request(&self) -> HttpRequest {
        HttpRequest::get(format!("{DATA_PATH}?{}", self.to_query_string()))
    }
}
