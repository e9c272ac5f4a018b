// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data model shared by the decoders and the client.
//!
//! Every record here is produced fresh per request. None of them is cached
//! by the client.

mod event_log;
mod identity;
mod power;
mod sensor;

pub use event_log::{EventLog, EventLogEntry};
pub use identity::SystemIdentity;
pub use power::{PowerAction, PowerState};
pub use sensor::{SensorData, SensorKind, SensorReading};
