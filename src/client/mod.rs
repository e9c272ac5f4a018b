// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level client for one management controller.
//!
//! [`Client`] hides the session entirely: the first operation logs in, an
//! expired session is renewed once transparently, and every response is
//! decoded into the crate's domain types.

mod config;
mod executor;

pub use config::ClientConfig;

use crate::command::{QueryCommand, SetCommand};
use crate::error::{Error, ParseError};
use crate::protocol::{ReqwestTransport, Transport};
use crate::response::{
    decode_event_log, decode_power_state, decode_sensor_group, decode_system_identity,
};
use crate::session::AuthHandshake;
use crate::types::{
    EventLog, PowerAction, PowerState, SensorData, SensorKind, SensorReading, SystemIdentity,
};

use executor::RequestExecutor;

/// A client for one controller.
///
/// A client is safe to share between tasks (wrap it in an `Arc`); all
/// callers use the same session.
///
/// # Examples
///
/// ```no_run
/// use idrac_lib::ClientConfig;
///
/// # async fn example() -> idrac_lib::Result<()> {
/// let client = ClientConfig::new("192.168.1.120")
///     .with_credentials("root", "calvin")
///     .into_client()?;
///
/// println!("power: {}", client.get_power_state().await?);
/// client.set_power("restart").await?;
///
/// let sensors = client.get_sensors().await?;
/// for reading in &sensors.temperatures {
///     println!("{}: {} {}", reading.name, reading.value, reading.unit);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client<T: Transport = ReqwestTransport> {
    executor: RequestExecutor<T>,
    host: String,
}

impl Client<ReqwestTransport> {
    /// Creates a client using the HTTPS transport.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(config.base_url(), config.timeout())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client over a custom transport.
    ///
    /// Only the credentials, handshake mode and host of `config` are used;
    /// addressing and timeouts are up to the transport.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let handshake = AuthHandshake::new(config.credentials().clone(), config.handshake());
        let host = config.host().to_string();
        Self {
            executor: RequestExecutor::new(transport, handshake, host.clone()),
            host,
        }
    }

    /// Returns the configured host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true while a session is held.
    ///
    /// The controller may still reject it; that is only discovered on the
    /// next request.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.executor.is_authenticated()
    }

    /// Logs in now, replacing any held session.
    ///
    /// Calling this is optional: every operation logs in on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`](crate::AuthError) if the controller refuses the
    /// credentials or hands out no session, or a protocol error.
    pub async fn authenticate(&self) -> Result<(), Error> {
        self.executor
            .authenticate()
            .await
            .inspect_err(|err| self.log_failure("authenticate", err))
    }

    /// Logs out and forgets the session.
    ///
    /// Succeeds without a request when no session is held. The local session
    /// is dropped even if the logout request fails.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the logout request could not be sent.
    pub async fn logout(&self) -> Result<(), Error> {
        self.executor
            .logout()
            .await
            .inspect_err(|err| self.log_failure("logout", err))
    }

    /// Queries the host power state.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not XML.
    pub async fn get_power_state(&self) -> Result<PowerState, Error> {
        self.query("get_power_state", QueryCommand::power_state(), decode_power_state)
            .await
    }

    /// Requests a power action by name.
    ///
    /// Accepted names are `off`, `on`, `restart`, `reset`, `nmi` and
    /// `shutdown`, in any letter case. An unknown name is rejected before
    /// anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnknownAction`](crate::ValueError::UnknownAction)
    /// for an unknown name, otherwise the errors of
    /// [`set_power_action`](Self::set_power_action).
    pub async fn set_power(&self, action: &str) -> Result<(), Error> {
        let action: PowerAction = action.parse()?;
        self.set_power_action(action).await
    }

    /// Requests a power action.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn set_power_action(&self, action: PowerAction) -> Result<(), Error> {
        self.executor
            .execute(&SetCommand::power(action))
            .await
            .inspect_err(|err| self.log_failure("set_power", err))?;
        tracing::info!(host = %self.host, %action, "Power action requested");
        Ok(())
    }

    /// Reads all sensor groups.
    ///
    /// The three groups are queried concurrently. A group whose query fails
    /// is reported empty and the failure is logged, so a partial or total
    /// outage still yields a result.
    ///
    /// # Errors
    ///
    /// Group failures are not errors; the result is always `Ok`.
    pub async fn get_sensors(&self) -> Result<SensorData, Error> {
        let (temperatures, fans, voltages) = tokio::join!(
            self.get_sensor_group(SensorKind::Temperature),
            self.get_sensor_group(SensorKind::Fan),
            self.get_sensor_group(SensorKind::Voltage),
        );

        let mut data = SensorData::default();
        for (kind, result) in [
            (SensorKind::Temperature, temperatures),
            (SensorKind::Fan, fans),
            (SensorKind::Voltage, voltages),
        ] {
            match result {
                Ok(readings) => data.set_group(kind, readings),
                Err(err) => {
                    tracing::warn!(host = %self.host, group = %kind, error = %err, "Sensor group unavailable");
                }
            }
        }
        Ok(data)
    }

    /// Reads one sensor group.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not XML.
    pub async fn get_sensor_group(&self, kind: SensorKind) -> Result<Vec<SensorReading>, Error> {
        self.query("get_sensor_group", QueryCommand::sensors(kind), |body| {
            decode_sensor_group(body, kind)
        })
        .await
    }

    /// Reads the system identity and firmware versions.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not XML.
    pub async fn get_system_identity(&self) -> Result<SystemIdentity, Error> {
        self.query(
            "get_system_identity",
            QueryCommand::system_identity(),
            decode_system_identity,
        )
        .await
    }

    /// Reads the system event log.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not XML.
    pub async fn get_event_log(&self) -> Result<EventLog, Error> {
        self.query("get_event_log", QueryCommand::event_log(), decode_event_log)
            .await
    }

    /// Clears the system event log.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn clear_event_log(&self) -> Result<(), Error> {
        self.executor
            .execute(&SetCommand::clear_event_log())
            .await
            .inspect_err(|err| self.log_failure("clear_event_log", err))?;
        tracing::info!(host = %self.host, "Event log cleared");
        Ok(())
    }

    /// Runs a query and decodes its body.
    async fn query<R>(
        &self,
        operation: &'static str,
        command: QueryCommand,
        decode: impl FnOnce(&str) -> Result<R, ParseError>,
    ) -> Result<R, Error> {
        let result = match self.executor.execute(&command).await {
            Ok(body) => decode(&body).map_err(Error::from),
            Err(err) => Err(err),
        };
        result.inspect_err(|err| self.log_failure(operation, err))
    }

    fn log_failure(&self, operation: &'static str, err: &Error) {
        tracing::warn!(host = %self.host, operation, error = %err, "Operation failed");
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
