// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of clients for a fleet of controllers.
//!
//! The registry starts from a set of host configurations and accepts more
//! at runtime. A [`Client`] is created the first time its host is used and
//! shared from then on, so every caller of one host reuses one session.
//! Clients are only dropped through [`ClientRegistry::remove`] or when
//! their host is replaced.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::client::{Client, ClientConfig};
use crate::error::Error;
use crate::session::{Credentials, HandshakeMode};

/// Connection settings for one registered host.
///
/// # Examples
///
/// ```
/// use idrac_lib::registry::HostConfig;
///
/// let config: HostConfig = serde_json::from_str(
///     r#"{ "name": "web01", "host": "192.168.1.120", "password": "calvin" }"#,
/// )?;
/// assert_eq!(config.port, 443);
/// assert_eq!(config.username, "root");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// Display name.
    pub name: String,
    /// Hostname or IP address of the controller.
    pub host: String,
    /// Port, 443 unless given.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login name, `root` unless given.
    #[serde(default = "default_username")]
    pub username: String,
    /// Login password.
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Login variant.
    #[serde(default)]
    pub handshake: HandshakeMode,
    /// Per-request timeout in seconds, 10 unless given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_port() -> u16 {
    ClientConfig::DEFAULT_HTTPS_PORT
}

fn default_username() -> String {
    Credentials::DEFAULT_USERNAME.to_string()
}

impl HostConfig {
    /// Creates a host entry with default port, username and handshake.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: default_port(),
            username: default_username(),
            password: String::new(),
            handshake: HandshakeMode::default(),
            timeout_secs: None,
        }
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Builds the client configuration for this host.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.host.clone())
            .with_port(self.port)
            .with_credentials(self.username.clone(), self.password.clone())
            .with_handshake(self.handshake);
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

impl std::fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("handshake", &self.handshake)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Public view of a registered host, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    /// Registry key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hostname or IP address.
    pub host: String,
    /// Port.
    pub port: u16,
}

/// Lazily-built clients keyed by host id.
///
/// # Examples
///
/// ```no_run
/// use idrac_lib::registry::ClientRegistry;
///
/// # async fn example() -> idrac_lib::Result<()> {
/// let registry = ClientRegistry::from_json(
///     r#"{ "web01": { "name": "Web 01", "host": "192.168.1.120", "password": "calvin" } }"#,
/// )?;
///
/// let client = registry.get_or_create("web01").await?;
/// println!("{}", client.get_power_state().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClientRegistry {
    // Lock order: hosts, then clients.
    hosts: RwLock<HashMap<String, HostConfig>>,
    clients: RwLock<HashMap<String, Arc<Client>>>,
}

impl ClientRegistry {
    /// Creates a registry over the given hosts.
    #[must_use]
    pub fn new(hosts: HashMap<String, HostConfig>) -> Self {
        Self {
            hosts: RwLock::new(hosts),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry from a JSON object mapping host ids to [`HostConfig`]s.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the JSON does not describe a host map.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let hosts: HashMap<String, HostConfig> =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        tracing::debug!(hosts = hosts.len(), "Loaded host configuration");
        Ok(Self::new(hosts))
    }

    /// Registers a host, replacing any entry with the same id.
    ///
    /// A replaced host's cached client is dropped, so the next
    /// [`get_or_create`](Self::get_or_create) logs in with the new settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the id, host or username is empty.
    pub async fn add_host(&self, id: impl Into<String>, config: HostConfig) -> Result<(), Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::Config("host id must not be empty".to_string()));
        }
        if config.host.trim().is_empty() {
            return Err(Error::Config(format!("host {id}: address must not be empty")));
        }
        if config.username.trim().is_empty() {
            return Err(Error::Config(format!("host {id}: username must not be empty")));
        }

        let mut hosts = self.hosts.write().await;
        let address = config.host.clone();
        let replaced = hosts.insert(id.clone(), config).is_some();
        if replaced {
            self.clients.write().await.remove(&id);
        }
        tracing::info!(id = %id, host = %address, replaced, "Host registered");
        Ok(())
    }

    /// Lists the registered hosts, sorted by id.
    pub async fn hosts(&self) -> Vec<HostSummary> {
        let mut summaries: Vec<HostSummary> = self
            .hosts
            .read()
            .await
            .iter()
            .map(|(id, config)| HostSummary {
                id: id.clone(),
                name: config.name.clone(),
                host: config.host.clone(),
                port: config.port,
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Returns the client for a host, creating it on first use.
    ///
    /// Creating a client sends nothing; the first operation on it logs in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostNotFound`] for an unknown id, or an error if the
    /// host's address is invalid.
    pub async fn get_or_create(&self, id: &str) -> Result<Arc<Client>, Error> {
        if let Some(client) = self.clients.read().await.get(id) {
            return Ok(Arc::clone(client));
        }

        let hosts = self.hosts.read().await;
        let config = hosts
            .get(id)
            .ok_or_else(|| Error::HostNotFound(id.to_string()))?;

        let mut clients = self.clients.write().await;
        // Another caller may have created it between the two locks.
        if let Some(client) = clients.get(id) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(Client::new(config.client_config())?);
        clients.insert(id.to_string(), Arc::clone(&client));
        tracing::info!(id, host = %config.host, "Client created");
        Ok(client)
    }

    /// Drops the client of a host. Returns true if one existed.
    ///
    /// Callers still holding the client keep using it; the next
    /// [`get_or_create`](Self::get_or_create) builds a new one.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.clients.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(id, "Client removed");
        }
        removed
    }

    /// Returns the number of live clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}
