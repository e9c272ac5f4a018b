// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! System identity.

use serde::Serialize;

/// Identification and firmware information of the managed server.
///
/// Fields the controller did not report are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemIdentity {
    /// Host name of the server.
    pub hostname: String,
    /// Model description, e.g. `PowerEdge R710`.
    pub model: String,
    /// Vendor service tag.
    pub service_tag: String,
    /// BIOS version.
    pub bios_version: String,
    /// Controller firmware version.
    pub firmware_version: String,
    /// Lifecycle/management firmware version.
    pub management_firmware_version: String,
    /// System board revision.
    pub system_revision: String,
    /// Installed operating system, when the controller knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
}
