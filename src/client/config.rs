// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection settings for one controller.

use std::time::Duration;

use crate::client::Client;
use crate::error::Error;
use crate::protocol::ReqwestTransport;
use crate::session::{Credentials, HandshakeMode};

/// Configuration for a controller client.
///
/// HTTPS on port 443 is the default, matching factory settings.
///
/// # Examples
///
/// ```
/// use idrac_lib::{ClientConfig, HandshakeMode};
/// use std::time::Duration;
///
/// let config = ClientConfig::new("192.168.1.120")
///     .with_credentials("root", "calvin")
///     .with_timeout(Duration::from_secs(5))
///     .with_handshake(HandshakeMode::TwoStep);
/// assert_eq!(config.base_url(), "https://192.168.1.120");
///
/// let config = ClientConfig::new("10.0.0.5").with_port(8443);
/// assert_eq!(config.base_url(), "https://10.0.0.5:8443");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    host: String,
    port: u16,
    use_https: bool,
    credentials: Credentials,
    timeout: Duration,
    handshake: HandshakeMode,
}

impl ClientConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default HTTPS port.
    pub const DEFAULT_HTTPS_PORT: u16 = 443;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given host.
    ///
    /// A host that already starts with `http://` or `https://` is used as
    /// the base URL verbatim; port and scheme settings are then ignored.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_HTTPS_PORT,
            use_https: true,
            credentials: Credentials::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            handshake: HandshakeMode::default(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Switches to plain HTTP.
    ///
    /// If the port hasn't been changed from 443, it becomes 80.
    #[must_use]
    pub fn without_https(mut self) -> Self {
        self.use_https = false;
        if self.port == Self::DEFAULT_HTTPS_PORT {
            self.port = Self::DEFAULT_PORT;
        }
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the login variant.
    #[must_use]
    pub fn with_handshake(mut self, handshake: HandshakeMode) -> Self {
        self.handshake = handshake;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether HTTPS is used.
    #[must_use]
    pub fn use_https(&self) -> bool {
        self.use_https
    }

    /// Returns the credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the login variant.
    #[must_use]
    pub fn handshake(&self) -> HandshakeMode {
        self.handshake
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }

        let scheme = if self.use_https { "https" } else { "http" };
        let default_port = if self.use_https {
            Self::DEFAULT_HTTPS_PORT
        } else {
            Self::DEFAULT_PORT
        };
        let port_suffix = if self.port == default_port {
            String::new()
        } else {
            format!(":{}", self.port)
        };
        format!("{scheme}://{}{port_suffix}", self.host)
    }

    /// Creates a [`Client`] using the HTTPS transport.
    ///
    /// No network traffic happens here; the first operation logs in.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be created.
    pub fn into_client(self) -> Result<Client<ReqwestTransport>, Error> {
        Client::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new("192.168.1.120");
        assert_eq!(config.port(), 443);
        assert!(config.use_https());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.handshake(), HandshakeMode::Auto);
        assert_eq!(config.credentials().username(), "root");
        assert_eq!(config.base_url(), "https://192.168.1.120");
    }

    #[test]
    fn plain_http_switches_default_port() {
        let config = ClientConfig::new("idrac.local").without_https();
        assert_eq!(config.port(), 80);
        assert_eq!(config.base_url(), "http://idrac.local");
    }

    #[test]
    fn custom_port_is_kept_when_switching_scheme() {
        let config = ClientConfig::new("idrac.local")
            .with_port(8080)
            .without_https();
        assert_eq!(config.base_url(), "http://idrac.local:8080");
    }

    #[test]
    fn explicit_scheme_is_used_verbatim() {
        let config = ClientConfig::new("http://127.0.0.1:3000/").with_port(9999);
        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn invalid_host_fails_client_creation() {
        let result = ClientConfig::new("not a host").into_client();
        assert!(result.is_err());
    }
}
