// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session-aware request execution.
//!
//! Every data request goes through [`RequestExecutor::execute`]:
//!
//! 1. log in if no session is held
//! 2. send the request with the session credentials attached
//! 3. on 401, log in again once and replay the request once
//!
//! Handshakes are serialized by an async gate so concurrent callers that
//! all find the session missing or rejected do not stampede the login page.
//! Data requests themselves run concurrently.

use tokio::sync::Mutex;

use crate::command::Command;
use crate::error::{AuthError, Error, ProtocolError};
use crate::protocol::{HttpRequest, HttpResponse, LOGOUT_PATH, Transport};
use crate::session::{AuthHandshake, Session, SessionStore};

pub(crate) struct RequestExecutor<T> {
    transport: T,
    handshake: AuthHandshake,
    store: SessionStore,
    login_gate: Mutex<()>,
    host: String,
}

impl<T: Transport> RequestExecutor<T> {
    pub(crate) fn new(transport: T, handshake: AuthHandshake, host: impl Into<String>) -> Self {
        Self {
            transport,
            handshake,
            store: SessionStore::default(),
            login_gate: Mutex::new(()),
            host: host.into(),
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.store.is_present()
    }

    /// Performs a fresh handshake, replacing any held session.
    pub(crate) async fn authenticate(&self) -> Result<(), Error> {
        let _gate = self.login_gate.lock().await;
        self.login().await.map(drop)
    }

    /// Sends a command and returns the body of its successful response.
    pub(crate) async fn execute<C: Command>(&self, command: &C) -> Result<String, Error> {
        let session = self.session().await?;
        let response = self.send(command, &session).await?;
        if !response.is_unauthorized() {
            return into_body(response);
        }

        tracing::warn!(
            host = %self.host,
            command = %command.describe(),
            "Session rejected, reauthenticating"
        );
        let session = self.reauthenticate(&session).await?;

        let response = self.send(command, &session).await?;
        if response.is_unauthorized() {
            self.expire(&session).await;
            return Err(AuthError::AuthenticationExpired {
                reason: "request rejected again after reauthentication".to_string(),
            }
            .into());
        }
        into_body(response)
    }

    /// Ends the session on the controller and forgets it locally.
    ///
    /// The local session is dropped before the request is sent, so it is
    /// gone even when the controller cannot be reached.
    pub(crate) async fn logout(&self) -> Result<(), Error> {
        let _gate = self.login_gate.lock().await;
        let Some(session) = self.store.take() else {
            tracing::debug!(host = %self.host, "No session to log out");
            return Ok(());
        };

        let response = self
            .transport
            .execute(&session.apply(HttpRequest::get(LOGOUT_PATH)))
            .await?;
        tracing::info!(host = %self.host, status = response.status(), "Logged out");
        Ok(())
    }

    /// Returns the held session, logging in first if there is none.
    async fn session(&self) -> Result<Session, Error> {
        if let Some(session) = self.store.current() {
            return Ok(session);
        }

        let _gate = self.login_gate.lock().await;
        // Another caller may have logged in while this one waited.
        if let Some(session) = self.store.current() {
            return Ok(session);
        }
        self.login().await
    }

    /// Replaces a rejected session.
    ///
    /// A failed attempt leaves the store empty and is reported as
    /// [`AuthError::AuthenticationExpired`].
    async fn reauthenticate(&self, rejected: &Session) -> Result<Session, Error> {
        let _gate = self.login_gate.lock().await;
        if let Some(current) = self.store.current().filter(|current| current != rejected) {
            tracing::debug!(host = %self.host, "Session already refreshed by another request");
            return Ok(current);
        }

        self.login().await.map_err(|err| {
            self.store.clear();
            tracing::warn!(host = %self.host, error = %err, "Reauthentication failed");
            Error::from(AuthError::AuthenticationExpired {
                reason: format!("reauthentication failed: {err}"),
            })
        })
    }

    /// Forgets a session the controller rejected twice.
    ///
    /// A session another caller has installed since is kept.
    async fn expire(&self, rejected: &Session) {
        let _gate = self.login_gate.lock().await;
        if !self.store.clear_if(rejected) {
            tracing::debug!(host = %self.host, "Rejected session already replaced");
        }
    }

    /// Runs the handshake and stores the result. Callers hold the gate.
    async fn login(&self) -> Result<Session, Error> {
        let session = self.handshake.run(&self.transport).await?;
        self.store.replace(session.clone());
        tracing::debug!(host = %self.host, "Session established");
        Ok(session)
    }

    async fn send<C: Command>(&self, command: &C, session: &Session) -> Result<HttpResponse, Error> {
        let request = session.apply(command.to_request());
        let response = self.transport.execute(&request).await?;
        tracing::debug!(
            host = %self.host,
            command = %command.describe(),
            status = response.status(),
            "Command completed"
        );
        Ok(response)
    }
}

fn into_body(response: HttpResponse) -> Result<String, Error> {
    if response.is_success() {
        Ok(response.into_body())
    } else {
        Err(ProtocolError::UnexpectedStatus {
            code: response.status(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use parking_lot::Mutex as SyncMutex;

    use super::*;
    use crate::command::QueryCommand;
    use crate::protocol::{DATA_PATH, LOGIN_PATH, SESSION_COOKIE};
    use crate::session::{Credentials, HandshakeMode};

    /// Logs in with a fresh numbered session each time and answers data
    /// requests from a queue of statuses. Data requests yield once so
    /// concurrent callers interleave.
    struct FakeController {
        logins: SyncMutex<u32>,
        data_statuses: SyncMutex<VecDeque<u16>>,
        requests: SyncMutex<Vec<HttpRequest>>,
    }

    impl FakeController {
        fn new(data_statuses: impl IntoIterator<Item = u16>) -> Self {
            Self {
                logins: SyncMutex::new(0),
                data_statuses: SyncMutex::new(data_statuses.into_iter().collect()),
                requests: SyncMutex::new(Vec::new()),
            }
        }

        fn count(&self, prefix: &str) -> usize {
            self.requests
                .lock()
                .iter()
                .filter(|r| r.target().starts_with(prefix))
                .count()
        }
    }

    impl Transport for FakeController {
        async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProtocolError> {
            self.requests.lock().push(request.clone());
            if request.target() == LOGIN_PATH {
                let mut logins = self.logins.lock();
                *logins += 1;
                return Ok(HttpResponse::new(200, "<root><authResult>0</authResult></root>")
                    .with_cookie(SESSION_COOKIE, format!("s{}", *logins)));
            }
            tokio::task::yield_now().await;
            let status = self.data_statuses.lock().pop_front().unwrap_or(200);
            Ok(HttpResponse::new(status, "<root><pwState>1</pwState></root>"))
        }
    }

    fn executor(controller: FakeController) -> RequestExecutor<FakeController> {
        RequestExecutor::new(
            controller,
            AuthHandshake::new(Credentials::new("root", "calvin"), HandshakeMode::SingleStep),
            "test",
        )
    }

    #[tokio::test]
    async fn logs_in_lazily_once() {
        let executor = executor(FakeController::new([]));
        assert!(!executor.is_authenticated());

        executor.execute(&QueryCommand::power_state()).await.unwrap();
        executor.execute(&QueryCommand::power_state()).await.unwrap();

        assert!(executor.is_authenticated());
        assert_eq!(executor.transport.count(LOGIN_PATH), 1);
        assert_eq!(executor.transport.count(&format!("{DATA_PATH}?")), 2);
    }

    #[tokio::test]
    async fn retries_once_after_unauthorized() {
        let executor = executor(FakeController::new([401, 200]));

        let body = executor.execute(&QueryCommand::power_state()).await.unwrap();

        assert!(body.contains("pwState"));
        assert_eq!(executor.transport.count(LOGIN_PATH), 2);
        let requests = executor.transport.requests.lock().clone();
        let last = requests.last().unwrap();
        assert_eq!(last.header("Cookie"), Some("_appwebSessionId_=s2"));
    }

    #[tokio::test]
    async fn second_unauthorized_expires_session() {
        let executor = executor(FakeController::new([401, 401]));

        let err = executor
            .execute(&QueryCommand::power_state())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Auth(AuthError::AuthenticationExpired { .. })
        ));
        assert!(!executor.is_authenticated());
        assert_eq!(executor.transport.count(LOGIN_PATH), 2);
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let executor = executor(FakeController::new([500]));

        let err = executor
            .execute(&QueryCommand::power_state())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnexpectedStatus { code: 500 })
        ));
        assert_eq!(executor.transport.count(LOGIN_PATH), 1);
        assert!(executor.is_authenticated());
    }

    #[tokio::test]
    async fn logout_without_session_sends_nothing() {
        let executor = executor(FakeController::new([]));
        executor.logout().await.unwrap();
        assert!(executor.transport.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let executor = executor(FakeController::new([]));
        executor.authenticate().await.unwrap();
        assert!(executor.is_authenticated());

        executor.logout().await.unwrap();

        assert!(!executor.is_authenticated());
        assert_eq!(executor.transport.count(LOGOUT_PATH), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_login() {
        let executor = executor(FakeController::new([]));
        let command = QueryCommand::power_state();

        let (a, b, c) = tokio::join!(
            executor.execute(&command),
            executor.execute(&command),
            executor.execute(&command)
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(executor.transport.count(LOGIN_PATH), 1);
    }

    #[tokio::test]
    async fn concurrent_rejections_reauthenticate_once() {
        let executor = executor(FakeController::new([401, 401, 200, 200]));
        executor.authenticate().await.unwrap();
        let command = QueryCommand::power_state();

        let (a, b) = tokio::join!(executor.execute(&command), executor.execute(&command));

        assert!(a.is_ok() && b.is_ok());
        // Initial login plus a single reauthentication.
        assert_eq!(executor.transport.count(LOGIN_PATH), 2);
        let requests = executor.transport.requests.lock().clone();
        let retries: Vec<_> = requests
            .iter()
            .filter(|r| r.target().starts_with(&format!("{DATA_PATH}?")))
            .skip(2)
            .map(|r| r.header("Cookie").map(str::to_string))
            .collect();
        assert_eq!(retries, vec![Some("_appwebSessionId_=s2".to_string()); 2]);
    }

    #[tokio::test]
    async fn expire_keeps_a_refreshed_session() {
        let executor = executor(FakeController::new([]));
        executor.authenticate().await.unwrap();
        executor.authenticate().await.unwrap();

        executor.expire(&Session::new("s1")).await;
        assert!(executor.is_authenticated());

        executor.expire(&Session::new("s2")).await;
        assert!(!executor.is_authenticated());
    }
}
