// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! System identity decoding.

use crate::error::ParseError;
use crate::response::XmlElement;
use crate::types::SystemIdentity;

/// Decodes the system identity fields.
///
/// Each missing field decodes to an empty string; a missing or empty
/// `osName` decodes to `None`.
///
/// # Errors
///
/// Returns `ParseError` only if the body is not XML.
pub fn decode_system_identity(body: &str) -> Result<SystemIdentity, ParseError> {
    let root = XmlElement::parse(body)?;
    let text = |key: &str| root.find(key).map_or("", XmlElement::text).to_string();

    let os_name = text("osName");
    Ok(SystemIdentity {
        hostname: text("hostName"),
        model: text("sysDesc"),
        service_tag: text("svcTag"),
        bios_version: text("biosVer"),
        firmware_version: text("fwVersion"),
        management_firmware_version: text("LCCfwVersion"),
        system_revision: text("sysRev"),
        os_name: (!os_name.is_empty()).then_some(os_name),
    })
}
