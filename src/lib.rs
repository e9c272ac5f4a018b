// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `idrac_lib` - async client for legacy iDRAC-style management controllers.
//!
//! These controllers speak a proprietary XML-over-HTTP protocol: a cookie
//! session obtained through a multi-step login, data read with `get=` queries
//! and changed with `set=` commands, and responses whose shape differs from
//! one firmware revision to the next.
//!
//! # Supported Features
//!
//! - **Sessions**: two-step, single-step or auto-detected login, secondary
//!   tokens on newer firmware, transparent one-shot recovery from expiry
//! - **Power control**: state query and the six chassis actions
//! - **Telemetry**: temperature, fan and voltage sensors with thresholds
//! - **Inventory**: host name, model, service tag, BIOS and firmware versions
//! - **Event log**: read and clear the system event log
//! - **Virtual media**: attach and detach remote images through a
//!   caller-supplied [`CommandRunner`](media::CommandRunner)
//! - **Fleets**: a [`ClientRegistry`](registry::ClientRegistry) sharing one
//!   client per host
//!
//! # Quick Start
//!
//! ```no_run
//! use idrac_lib::{ClientConfig, PowerState};
//!
//! #[tokio::main]
//! async fn main() -> idrac_lib::Result<()> {
//!     let client = ClientConfig::new("192.168.1.120")
//!         .with_credentials("root", "calvin")
//!         .into_client()?;
//!
//!     if client.get_power_state().await? == PowerState::Off {
//!         client.set_power("on").await?;
//!     }
//!
//!     let identity = client.get_system_identity().await?;
//!     println!("{} ({})", identity.model, identity.service_tag);
//!
//!     let log = client.get_event_log().await?;
//!     for entry in &log.entries {
//!         println!("[{}] {} {}", entry.severity, entry.timestamp, entry.description);
//!     }
//!
//!     client.logout().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Old Firmware
//!
//! Some controllers only negotiate TLS 1.0. Enable the `legacy-tls` feature
//! to use the platform TLS stack with TLS 1.0 allowed.

pub mod client;
pub mod command;
pub mod error;
pub mod media;
pub mod protocol;
pub mod registry;
pub mod response;
pub mod session;
pub mod types;

pub use client::{Client, ClientConfig};
pub use error::{AuthError, Error, ParseError, ProtocolError, Result, ValueError};
pub use media::{CommandRunner, MediaStatus, VirtualMedia};
pub use protocol::{ReqwestTransport, Transport};
pub use registry::{ClientRegistry, HostConfig, HostSummary};
pub use session::{Credentials, HandshakeMode};
pub use types::{
    EventLog, EventLogEntry, PowerAction, PowerState, SensorData, SensorKind, SensorReading,
    SystemIdentity,
};
