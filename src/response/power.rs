// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state decoding.

use crate::error::ParseError;
use crate::response::XmlElement;
use crate::types::PowerState;

/// Decodes the `pwState` field.
///
/// A missing field decodes to [`PowerState::Unknown`].
///
/// # Errors
///
/// Returns `ParseError` only if the body is not XML.
///
/// # Examples
///
/// ```
/// use idrac_lib::response::decode_power_state;
/// use idrac_lib::types::PowerState;
///
/// let state = decode_power_state("<root><pwState>1</pwState></root>").unwrap();
/// assert_eq!(state, PowerState::On);
/// ```
pub fn decode_power_state(body: &str) -> Result<PowerState, ParseError> {
    let root = XmlElement::parse(body)?;
    let state = match root.find("pwState") {
        Some(field) => PowerState::from_code(field.text()),
        None => {
            tracing::debug!("Response carries no pwState, reporting unknown");
            PowerState::Unknown
        }
    };
    Ok(state)
}
