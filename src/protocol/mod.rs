// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single request/response exchanges with the controller.
//!
//! The [`Transport`] trait is the seam between the session logic and the
//! network. [`ReqwestTransport`] is the production implementation; tests and
//! embedders can provide their own.
//!
//! Requests and responses are plain values: the transport never decides
//! anything about sessions or retries.

mod http;

pub use http::ReqwestTransport;

use std::fmt;

use crate::error::ProtocolError;

/// Name of the cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "_appwebSessionId_";

/// Page fetched to obtain a pre-login session identifier.
pub const BOOTSTRAP_PATH: &str = "/start.html";

/// Endpoint receiving the login form.
pub const LOGIN_PATH: &str = "/data/login";

/// Endpoint for data queries and commands.
pub const DATA_PATH: &str = "/data";

/// Endpoint terminating the session.
pub const LOGOUT_PATH: &str = "/data/logout";

/// Header carrying the secondary token on newer firmware.
pub const SECONDARY_TOKEN_HEADER: &str = "ST2";

/// HTTP method of a controller request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// A request to the controller, relative to its base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl HttpRequest {
    /// Creates a `GET` request for a path with an optional query string.
    #[must_use]
    pub fn get(target: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            target: target.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a `POST` request carrying an already-encoded form body.
    ///
    /// The body is sent verbatim so that field order is preserved.
    #[must_use]
    pub fn post_form(target: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            target: target.into(),
            headers: vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: Some(body.into()),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches the session identifier as a cookie.
    #[must_use]
    pub fn with_session_cookie(self, session_id: &str) -> Self {
        self.with_header("Cookie", format!("{SESSION_COOKIE}={session_id}"))
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the path and query string.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the value of the first header with the given name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// A response from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    cookies: Vec<(String, String)>,
    raw_set_cookie: Vec<String>,
    body: String,
}

impl HttpResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            cookies: Vec::new(),
            raw_set_cookie: Vec::new(),
            body: body.into(),
        }
    }

    /// Adds a cookie as parsed by the HTTP library.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Adds a raw `Set-Cookie` header value.
    #[must_use]
    pub fn with_raw_set_cookie(mut self, header: impl Into<String>) -> Self {
        self.raw_set_cookie.push(header.into());
        self
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the response, returning the body.
    #[must_use]
    pub fn into_body(self) -> String {
        self.body
    }

    /// Looks up a cookie value.
    ///
    /// Parsed cookies are consulted first. Some firmware emits `Set-Cookie`
    /// headers that cookie parsers normalize away, so the raw headers are
    /// scanned when no parsed cookie matches. Empty values count as absent.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, v)| n == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
            .or_else(|| {
                self.raw_set_cookie
                    .iter()
                    .find_map(|header| raw_cookie_value(header, name))
            })
    }
}

/// Extracts `name=value` from a raw `Set-Cookie` header, stopping at `;`.
fn raw_cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=");
    let mut from = 0;
    while let Some(found) = header[from..].find(&needle) {
        let start = from + found;
        let at_boundary = header[..start]
            .chars()
            .next_back()
            .is_none_or(|c| c == ';' || c == ',' || c.is_whitespace());
        if at_boundary {
            let rest = &header[start + needle.len()..];
            let value = rest.split(';').next().unwrap_or_default().trim();
            let value = value.trim_matches('"');
            return (!value.is_empty()).then_some(value);
        }
        from = start + needle.len();
    }
    None
}

/// A single request/response exchange with the controller.
///
/// Implementations must bound every exchange with a timeout and report it
/// as [`ProtocolError::Timeout`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Sends one request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` when no response could be obtained.
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProtocolError>;
}
