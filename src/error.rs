// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `idrac_lib` library.
//!
//! The hierarchy separates transport failures, session/authentication
//! failures, undecodable payloads and caller-supplied value errors so that
//! callers can react to each class differently.
//!
//! Format mismatches inside an otherwise readable payload are never reported
//! here: the decoders absorb them and yield empty or zero-valued fields.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to the controller.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while establishing or recovering a session.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The response body could not be read as XML at all.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The requested host is not known to the registry.
    #[error("host not found: {0}")]
    HostNotFound(String),

    /// The host configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A command run through a [`CommandRunner`](crate::media::CommandRunner) failed.
    #[error("remote command `{command}` failed: {message}")]
    RemoteCommand {
        /// The command line that was executed.
        command: String,
        /// Description of the failure, usually captured stderr.
        message: String,
    },
}

/// Errors related to the HTTP exchange with the controller.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the controller failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The controller answered with a non-success status other than 401.
    #[error("unexpected HTTP status {code}")]
    UnexpectedStatus {
        /// The HTTP status code.
        code: u16,
    },
}

/// Errors related to the login handshake and session lifetime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Neither the bootstrap page nor the login response carried a session identifier.
    #[error("no session identifier could be obtained from the controller")]
    SessionBootstrap,

    /// The controller rejected the credentials.
    #[error("authentication failed{}{}", code_suffix(.code.as_ref()), message_suffix(.message.as_deref()))]
    AuthenticationFailed {
        /// The `authResult` value, if the controller sent one.
        code: Option<i64>,
        /// The `errorMsg` text, if the controller sent one.
        message: Option<String>,
    },

    /// The session expired and the single reauthentication attempt did not help.
    #[error("session expired: {reason}")]
    AuthenticationExpired {
        /// What went wrong during recovery.
        reason: String,
    },
}

fn code_suffix(code: Option<&i64>) -> String {
    code.map(|c| format!(" (authResult={c})")).unwrap_or_default()
}

fn message_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

/// Errors related to reading controller responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The body does not contain any XML element.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// Errors related to caller-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The power action name is not one of the supported actions.
    #[error("unknown power action: {0:?} (valid: off, on, restart, reset, nmi, shutdown)")]
    UnknownAction(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
