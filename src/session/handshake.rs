// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login handshake.
//!
//! Older firmware hands out the session cookie on a bootstrap page and then
//! expects it on the login POST. Newer firmware sets it on the login response
//! itself and may add secondary tokens through `forwardUrl`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Error, ProtocolError};
use crate::protocol::{BOOTSTRAP_PATH, HttpRequest, LOGIN_PATH, SESSION_COOKIE, Transport};
use crate::response::XmlElement;
use crate::session::Session;

/// `authResult` value reported on success.
const AUTH_SUCCESS: i64 = 0;

/// Which login variant to perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandshakeMode {
    /// Try the bootstrap page, continue without its cookie if none is set.
    #[default]
    Auto,
    /// Bootstrap page, then login carrying the bootstrap cookie.
    TwoStep,
    /// Login only; the session identifier comes from the login response.
    SingleStep,
}

impl fmt::Display for HandshakeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::TwoStep => "two-step",
            Self::SingleStep => "single-step",
        };
        f.write_str(name)
    }
}

/// Username and password for the controller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Default account name on factory-configured controllers.
    pub const DEFAULT_USERNAME: &'static str = "root";

    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login form body, user first and password second.
    fn form_body(&self) -> String {
        format!(
            "user={}&password={}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password)
        )
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(Self::DEFAULT_USERNAME, "")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Performs the login exchange and yields a [`Session`].
#[derive(Debug, Clone)]
pub(crate) struct AuthHandshake {
    credentials: Credentials,
    mode: HandshakeMode,
}

impl AuthHandshake {
    pub(crate) fn new(credentials: Credentials, mode: HandshakeMode) -> Self {
        Self { credentials, mode }
    }

    /// Runs the handshake against the controller.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionBootstrap`] if no session identifier is obtained
    /// - [`AuthError::AuthenticationFailed`] if `authResult` is missing or non-zero
    /// - [`ProtocolError`] on transport failure or an unexpected login status
    pub(crate) async fn run<T: Transport>(&self, transport: &T) -> Result<Session, Error> {
        let bootstrap_id = match self.mode {
            HandshakeMode::SingleStep => None,
            HandshakeMode::TwoStep => Some(
                bootstrap(transport)
                    .await?
                    .ok_or(AuthError::SessionBootstrap)?,
            ),
            HandshakeMode::Auto => {
                let id = bootstrap(transport).await?;
                if id.is_none() {
                    tracing::debug!("Bootstrap page set no session cookie, logging in without it");
                }
                id
            }
        };

        let mut request = HttpRequest::post_form(LOGIN_PATH, self.credentials.form_body());
        if let Some(id) = &bootstrap_id {
            request = request.with_session_cookie(id);
        }
        let response = transport.execute(&request).await?;

        if response.is_unauthorized() {
            return Err(AuthError::AuthenticationFailed {
                code: None,
                message: Some("login rejected with HTTP 401".to_string()),
            }
            .into());
        }
        if !response.is_success() {
            return Err(ProtocolError::UnexpectedStatus {
                code: response.status(),
            }
            .into());
        }

        let root = XmlElement::parse(response.body())?;
        check_auth_result(&root)?;

        // Firmware that rotates the identifier at login wins over the bootstrap one.
        let session_id = response
            .cookie(SESSION_COOKIE)
            .map(str::to_string)
            .or(bootstrap_id)
            .ok_or(AuthError::SessionBootstrap)?;

        let mut session = Session::new(session_id);
        if let Some(forward_url) = root
            .find("forwardUrl")
            .map(XmlElement::text)
            .filter(|url| !url.is_empty())
        {
            session = session.with_forward_url(forward_url);
        }

        tracing::info!(
            username = %self.credentials.username,
            mode = %self.mode,
            secondary_auth = session.uses_secondary_auth(),
            "Authenticated"
        );
        Ok(session)
    }
}

/// Fetches the bootstrap page and returns the session cookie it set, if any.
async fn bootstrap<T: Transport>(transport: &T) -> Result<Option<String>, Error> {
    let response = transport.execute(&HttpRequest::get(BOOTSTRAP_PATH)).await?;
    tracing::debug!(status = response.status(), "Bootstrap page fetched");
    Ok(response.cookie(SESSION_COOKIE).map(str::to_string))
}

fn check_auth_result(root: &XmlElement) -> Result<(), AuthError> {
    let code = root
        .find("authResult")
        .and_then(|field| field.text().parse::<i64>().ok());
    if code == Some(AUTH_SUCCESS) {
        return Ok(());
    }

    let message = root
        .find("errorMsg")
        .map(XmlElement::text)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    tracing::warn!(auth_result = ?code, error_msg = ?message, "Login rejected");
    Err(AuthError::AuthenticationFailed { code, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HttpResponse;
    use parking_lot::Mutex;

    /// Answers by request target and records everything it is asked.
    struct ScriptedTransport {
        bootstrap: HttpResponse,
        login: HttpResponse,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(bootstrap: HttpResponse, login: HttpResponse) -> Self {
            Self {
                bootstrap,
                login,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProtocolError> {
            self.requests.lock().push(request.clone());
            match request.target() {
                BOOTSTRAP_PATH => Ok(self.bootstrap.clone()),
                LOGIN_PATH => Ok(self.login.clone()),
                other => Err(ProtocolError::ConnectionFailed(format!("unscripted {other}"))),
            }
        }
    }

    fn login_ok(forward_url: &str) -> HttpResponse {
        HttpResponse::new(
            200,
            format!("<root><authResult>0</authResult><forwardUrl>{forward_url}</forwardUrl></root>"),
        )
    }

    fn handshake(mode: HandshakeMode) -> AuthHandshake {
        AuthHandshake::new(Credentials::new("root", "calvin"), mode)
    }

    #[tokio::test]
    async fn two_step_sends_bootstrap_cookie_on_login() {
        let transport = ScriptedTransport::new(
            HttpResponse::new(200, "<html/>").with_cookie(SESSION_COOKIE, "boot"),
            login_ok("index.html"),
        );

        let session = handshake(HandshakeMode::TwoStep).run(&transport).await.unwrap();

        assert_eq!(session.session_id(), "boot");
        assert!(!session.uses_secondary_auth());
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].header("Cookie"), Some("_appwebSessionId_=boot"));
        assert_eq!(requests[1].body(), Some("user=root&password=calvin"));
    }

    #[tokio::test]
    async fn two_step_without_cookie_fails_bootstrap() {
        let transport =
            ScriptedTransport::new(HttpResponse::new(200, "<html/>"), login_ok("index.html"));

        let err = handshake(HandshakeMode::TwoStep).run(&transport).await.unwrap_err();

        assert!(matches!(err, Error::Auth(AuthError::SessionBootstrap)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn auto_falls_back_to_login_cookie() {
        let transport = ScriptedTransport::new(
            HttpResponse::new(200, "<html/>"),
            login_ok("index.html?ST1=a,ST2=b").with_cookie(SESSION_COOKIE, "fresh"),
        );

        let session = handshake(HandshakeMode::Auto).run(&transport).await.unwrap();

        assert_eq!(session.session_id(), "fresh");
        assert_eq!(session.secondary_tokens(), (Some("a"), Some("b")));
        assert_eq!(transport.requests()[1].header("Cookie"), None);
    }

    #[tokio::test]
    async fn login_cookie_replaces_bootstrap_cookie() {
        let transport = ScriptedTransport::new(
            HttpResponse::new(200, "").with_cookie(SESSION_COOKIE, "old"),
            login_ok("index.html").with_raw_set_cookie("_appwebSessionId_=new; path=/"),
        );

        let session = handshake(HandshakeMode::Auto).run(&transport).await.unwrap();
        assert_eq!(session.session_id(), "new");
    }

    #[tokio::test]
    async fn single_step_skips_bootstrap() {
        let transport = ScriptedTransport::new(
            HttpResponse::new(500, ""),
            login_ok("index.html").with_cookie(SESSION_COOKIE, "direct"),
        );

        let session = handshake(HandshakeMode::SingleStep).run(&transport).await.unwrap();

        assert_eq!(session.session_id(), "direct");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].target(), LOGIN_PATH);
    }

    #[tokio::test]
    async fn no_identifier_anywhere_is_bootstrap_error() {
        let transport =
            ScriptedTransport::new(HttpResponse::new(200, ""), login_ok("index.html"));

        let err = handshake(HandshakeMode::Auto).run(&transport).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::SessionBootstrap)));
    }

    #[tokio::test]
    async fn rejected_credentials_carry_code_and_message() {
        let transport = ScriptedTransport::new(
            HttpResponse::new(200, "").with_cookie(SESSION_COOKIE, "boot"),
            HttpResponse::new(
                200,
                "<root><authResult>1</authResult><errorMsg>bad password</errorMsg></root>",
            ),
        );

        let err = handshake(HandshakeMode::TwoStep).run(&transport).await.unwrap_err();

        match err {
            Error::Auth(AuthError::AuthenticationFailed { code, message }) => {
                assert_eq!(code, Some(1));
                assert_eq!(message.as_deref(), Some("bad password"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_auth_result_is_failure() {
        let transport = ScriptedTransport::new(
            HttpResponse::new(200, "").with_cookie(SESSION_COOKIE, "boot"),
            HttpResponse::new(200, "<root><forwardUrl>index.html</forwardUrl></root>"),
        );

        let err = handshake(HandshakeMode::Auto).run(&transport).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(AuthError::AuthenticationFailed {
                code: None,
                message: None
            })
        ));
    }

    #[tokio::test]
    async fn login_server_error_is_unexpected_status() {
        let transport = ScriptedTransport::new(
            HttpResponse::new(200, "").with_cookie(SESSION_COOKIE, "boot"),
            HttpResponse::new(503, ""),
        );

        let err = handshake(HandshakeMode::Auto).run(&transport).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::UnexpectedStatus { code: 503 })
        ));
    }

    #[test]
    fn form_body_is_url_encoded() {
        let credentials = Credentials::new("admin", "p&ss=word");
        assert_eq!(credentials.form_body(), "user=admin&password=p%26ss%3Dword");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let output = format!("{:?}", Credentials::new("root", "calvin"));
        assert!(output.contains("root"));
        assert!(!output.contains("calvin"));
    }

    #[test]
    fn handshake_mode_deserializes_kebab_case() {
        let mode: HandshakeMode = serde_json::from_str("\"two-step\"").unwrap();
        assert_eq!(mode, HandshakeMode::TwoStep);
        assert_eq!(HandshakeMode::default(), HandshakeMode::Auto);
    }
}
