// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTPS transport backed by `reqwest`.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::SET_COOKIE;

use crate::error::ProtocolError;
use crate::protocol::{HttpRequest, HttpResponse, Method, Transport};

/// Transport talking to one controller over HTTP(S).
///
/// Controllers ship self-signed certificates, so certificate verification is
/// disabled. With the `legacy-tls` feature the native TLS stack is used and
/// TLS 1.0 is allowed, which old firmware needs.
///
/// No cookie store is kept: the session cookie is attached explicitly by
/// the caller on every request.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use idrac_lib::protocol::ReqwestTransport;
///
/// let transport = ReqwestTransport::new("https://192.168.1.120", Duration::from_secs(10))?;
/// assert_eq!(transport.base_url(), "https://192.168.1.120");
/// # Ok::<(), idrac_lib::ProtocolError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProtocolError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ProtocolError::InvalidAddress(format!("{base_url}: {e}")))?;

        let builder = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true);

        #[cfg(feature = "legacy-tls")]
        let builder = builder
            .use_native_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_0);

        let client = builder.build().map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// Returns the base URL of the controller.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            ProtocolError::Timeout(u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX))
        } else if err.is_connect() {
            ProtocolError::ConnectionFailed(err.to_string())
        } else {
            ProtocolError::Http(err)
        }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProtocolError> {
        let url = format!("{}{}", self.base_url, request.target());

        tracing::debug!(method = %request.method(), url = %url, "Sending controller request");

        let mut builder = match request.method() {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let raw_set_cookie: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();

        let body = response.text().await.map_err(|e| self.map_error(e))?;

        tracing::debug!(status, bytes = body.len(), "Received controller response");

        let mut result = HttpResponse::new(status, body);
        for (name, value) in cookies {
            result = result.with_cookie(name, value);
        }
        for header in raw_set_cookie {
            result = result.with_raw_set_cookie(header);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let transport =
            ReqwestTransport::new("https://192.168.1.120/", Duration::from_secs(10)).unwrap();
        assert_eq!(transport.base_url(), "https://192.168.1.120");
    }

    #[test]
    fn new_rejects_invalid_url() {
        let result = ReqwestTransport::new("not a url", Duration::from_secs(10));
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn timeout_accessor() {
        let transport =
            ReqwestTransport::new("http://10.0.0.1:8080", Duration::from_secs(3)).unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(3));
    }
}
