//! Blocking Redfish session over HTTPS.
//!
//! This module provides the [`HttpConnector`] implementation of
//! [`Connector`] used against real BMCs. Authentication follows the
//! Redfish session model: a POST to the session service yields an
//! `X-Auth-Token` header carried on every subsequent request, and the
//! session resource is DELETEd on close.
//!
//! # TLS
//!
//! BMCs almost universally ship self-signed certificates, so the agent
//! is built with certificate verification disabled. Reads run under
//! the agent-wide [`READ_TIMEOUT`]; writes override it per request.

use super::{Connector, READ_TIMEOUT, Session};
use crate::error::{SessionError, SessionResult};
use serde_json::{Value, json};
use std::time::Duration;
use ureq::Agent;
use ureq::config::Config;
use ureq::http::Response;
use ureq::tls::TlsConfig;

/// Redfish session service path.
const SESSIONS_PATH: &str = "/redfish/v1/SessionService/Sessions";

/// Opens Redfish sessions over HTTPS.
pub struct HttpConnector {
    agent: Agent,
}

impl HttpConnector {
    /// Create a connector with the default agent configuration.
    #[must_use]
    pub fn new() -> Self {
        let config = Config::builder()
            .timeout_global(Some(READ_TIMEOUT))
            .http_status_as_error(false)
            .tls_config(TlsConfig::builder().disable_verification(true).build())
            .build();

        Self {
            agent: Agent::new_with_config(config),
        }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for HttpConnector {
    fn open(
        &self,
        machine: &str,
        user: &str,
        password: &str,
    ) -> SessionResult<Box<dyn Session>> {
        let base = format!("https://{machine}");
        let url = format!("{base}{SESSIONS_PATH}");
        let body = json!({ "UserName": user, "Password": password });

        let response = self
            .agent
            .post(&url)
            .send_json(&body)
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(SessionError::InvalidCredentials);
        }
        if !(200..300).contains(&status) {
            return Err(SessionError::SessionCreation(format!(
                "HTTP {status} creating session"
            )));
        }

        let token = header(&response, "x-auth-token").ok_or_else(|| {
            SessionError::SessionCreation("no X-Auth-Token in session response".to_string())
        })?;
        let session_path = header(&response, "location");

        Ok(Box::new(HttpSession {
            agent: self.agent.clone(),
            base,
            token,
            session_path,
        }))
    }
}

/// One authenticated Redfish session.
struct HttpSession {
    agent: Agent,
    base: String,
    token: String,
    session_path: Option<String>,
}

impl Session for HttpSession {
    fn get(&self, path: &str) -> SessionResult<Value> {
        let url = format!("{}{path}", self.base);
        let mut response = self
            .agent
            .get(&url)
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
            .call()
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(SessionError::SessionCreation(format!(
                "HTTP {status} reading {path}"
            )));
        }

        response.body_mut().read_json().map_err(classify_transport)
    }

    fn post(&self, path: &str, body: &Value, timeout: Duration) -> SessionResult<Value> {
        let url = format!("{}{path}", self.base);
        let mut response = self
            .agent
            .post(&url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .header("X-Auth-Token", &self.token)
            .send_json(body)
            .map_err(classify_transport)?;

        Ok(read_body(&mut response))
    }

    fn patch(&self, path: &str, body: &Value, timeout: Duration) -> SessionResult<Value> {
        let url = format!("{}{path}", self.base);
        let mut response = self
            .agent
            .patch(&url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .header("X-Auth-Token", &self.token)
            .send_json(body)
            .map_err(classify_transport)?;

        Ok(read_body(&mut response))
    }

    fn close(&self) {
        let Some(path) = &self.session_path else {
            return;
        };
        let url = if path.starts_with("http") {
            path.clone()
        } else {
            format!("{}{path}", self.base)
        };

        match self
            .agent
            .delete(&url)
            .header("X-Auth-Token", &self.token)
            .call()
        {
            Ok(_) => log::debug!("closed session against {}", self.base),
            Err(err) => log::debug!("failed to close session against {}: {err}", self.base),
        }
    }
}

/// Read a write response leniently.
///
/// Provisioning responses are interpreted from the payload, not the
/// status line, and some firmware answers with an empty or non-JSON
/// body on success.
fn read_body(response: &mut Response<ureq::Body>) -> Value {
    let ok = response.status().is_success();
    let text = response
        .body_mut()
        .read_to_string()
        .unwrap_or_default();
    parse_body(ok, &text)
}

/// Decode a write body, keeping the error indicator visible.
///
/// An undecodable body on a successful status is treated as an empty
/// payload; on a failing status it is wrapped under an `error` key so
/// interpretation still sees a rejected write rather than a success.
fn parse_body(ok: bool, text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) if ok => Value::Null,
        Err(_) => json!({ "error": { "body": text } }),
    }
}

fn header(response: &Response<ureq::Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Map transport-level failures onto the session error taxonomy.
fn classify_transport(err: ureq::Error) -> SessionError {
    let message = err.to_string();
    match err {
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed | ureq::Error::Io(_) => {
            SessionError::Unreachable(message)
        }
        ureq::Error::Timeout(_) | ureq::Error::TooManyRedirects => {
            SessionError::RetriesExhausted(message)
        }
        _ => SessionError::SessionCreation(message),
    }
}
