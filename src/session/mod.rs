// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session state and the login handshake.
//!
//! A [`Session`] is either fully present or absent; there is no half-set
//! token. The [`SessionStore`] only offers whole-session reads and writes,
//! each under a short lock, so a request never observes a token that is
//! being replaced.

mod handshake;

pub use handshake::{Credentials, HandshakeMode};
pub(crate) use handshake::AuthHandshake;

use std::fmt;

use parking_lot::Mutex;

use crate::protocol::{HttpRequest, SECONDARY_TOKEN_HEADER};

/// Credentials of an authenticated exchange with the controller.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Session {
    session_id: String,
    st1: Option<String>,
    st2: Option<String>,
}

impl Session {
    /// Creates a session from a non-empty identifier.
    pub(crate) fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            st1: None,
            st2: None,
        }
    }

    /// Adds the secondary tokens found in the login `forwardUrl`.
    #[must_use]
    pub(crate) fn with_forward_url(mut self, forward_url: &str) -> Self {
        let (st1, st2) = parse_secondary_tokens(forward_url);
        self.st1 = st1;
        self.st2 = st2;
        self
    }

    #[cfg(test)]
    pub(crate) fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Newer firmware hands out secondary tokens and expects them back.
    pub(crate) fn uses_secondary_auth(&self) -> bool {
        self.st1.is_some() || self.st2.is_some()
    }

    /// Attaches the session cookie and, when required, the secondary token.
    pub(crate) fn apply(&self, request: HttpRequest) -> HttpRequest {
        let request = request.with_session_cookie(&self.session_id);
        match (&self.st2, self.uses_secondary_auth()) {
            (Some(st2), true) => request.with_header(SECONDARY_TOKEN_HEADER, st2.as_str()),
            _ => request,
        }
    }

    #[cfg(test)]
    pub(crate) fn secondary_tokens(&self) -> (Option<&str>, Option<&str>) {
        (self.st1.as_deref(), self.st2.as_deref())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &"<redacted>")
            .field("uses_secondary_auth", &self.uses_secondary_auth())
            .finish()
    }
}

/// Parses `ST1`/`ST2` out of a forward URL like `index.html?ST1=abc,ST2=def`.
///
/// Parameters are separated by `,` on the firmware seen so far; `&` is
/// accepted as well. Empty values count as absent.
fn parse_secondary_tokens(forward_url: &str) -> (Option<String>, Option<String>) {
    let Some((_, query)) = forward_url.split_once('?') else {
        return (None, None);
    };

    let mut st1 = None;
    let mut st2 = None;
    for param in query.split([',', '&']) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "ST1" => st1 = Some(value.to_string()),
            "ST2" => st2 = Some(value.to_string()),
            _ => {}
        }
    }
    (st1, st2)
}

/// Holder of the current session, shared by all callers of one client.
#[derive(Debug, Default)]
pub(crate) struct SessionStore {
    current: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Returns a copy of the current session.
    pub(crate) fn current(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    /// Replaces the current session.
    pub(crate) fn replace(&self, session: Session) {
        *self.current.lock() = Some(session);
    }

    /// Removes and returns the current session.
    pub(crate) fn take(&self) -> Option<Session> {
        self.current.lock().take()
    }

    /// Drops the current session.
    pub(crate) fn clear(&self) {
        self.current.lock().take();
    }

    /// Drops the current session only if it is `session`. Returns true if
    /// it was dropped.
    pub(crate) fn clear_if(&self, session: &Session) -> bool {
        let mut current = self.current.lock();
        if current.as_ref() == Some(session) {
            current.take();
            true
        } else {
            false
        }
    }

    pub(crate) fn is_present(&self) -> bool {
        self.current.lock().is_some()
    }
}
