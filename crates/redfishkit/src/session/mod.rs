//! Session traits and implementations for talking to one BMC.
//!
//! This module provides the [`Connector`] and [`Session`] abstractions
//! the provisioning engine is written against. The primary
//! implementation is [`http::HttpConnector`], a blocking Redfish
//! session over HTTPS.
//!
//! # Testing
//!
//! Use [`MockConnector`] for testing without network access:
//!
//! ```
//! use redfishkit::session::{Connector, MockConnector, MockSession};
//! use serde_json::json;
//!
//! let mut session = MockSession::new();
//! session.add_response("/redfish/v1/Systems", json!({"Members": []}));
//!
//! let mut connector = MockConnector::new();
//! connector.add_machine("10.0.10.21", session);
//!
//! let opened = connector.open("10.0.10.21", "root", "calvin").unwrap();
//! let systems = opened.get("/redfish/v1/Systems").unwrap();
//! assert!(systems["Members"].as_array().unwrap().is_empty());
//! ```

pub mod http;

use crate::error::{SessionError, SessionResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default timeout for collection and resource reads.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Extended timeout for provisioning writes.
///
/// Account creation on some BMC firmware takes materially longer than
/// a read, so write calls carry their own bound instead of the agent
/// default.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(20);

/// An authenticated session against one machine.
///
/// A session is exclusively owned by the worker processing that
/// machine and is closed on every exit path. Write calls return the
/// raw response payload even when the BMC answered with an error
/// status; interpreting that payload is the job of
/// [`crate::response::interpret`].
pub trait Session: Send {
    /// Read a resource as JSON.
    fn get(&self, path: &str) -> SessionResult<Value>;

    /// Create a resource (POST), under an explicit timeout.
    fn post(&self, path: &str, body: &Value, timeout: Duration) -> SessionResult<Value>;

    /// Update a resource (PATCH), under an explicit timeout.
    fn patch(&self, path: &str, body: &Value, timeout: Duration) -> SessionResult<Value>;

    /// Tear the session down. Best-effort: failures are logged and
    /// swallowed, never reported as a machine outcome.
    fn close(&self);
}

/// Opens authenticated sessions against machines in the fleet.
///
/// This abstraction decouples the provisioning engine from the
/// transport and enables testing against in-memory fixtures.
pub trait Connector: Send + Sync {
    /// Open a session against `machine` with administrator credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] distinguishing unreachable machines,
    /// exhausted transport retries, rejected credentials and
    /// non-credential session-creation failures.
    fn open(&self, machine: &str, user: &str, password: &str)
    -> SessionResult<Box<dyn Session>>;
}

// ============================================================================
// Mock implementations
// ============================================================================

/// Which verb a recorded mock write used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    /// POST-style create.
    Post,
    /// PATCH-style update.
    Patch,
}

/// One write issued against a [`MockSession`].
#[derive(Debug, Clone)]
pub struct WriteRecord {
    /// Verb used.
    pub method: WriteMethod,
    /// Target resource path.
    pub path: String,
    /// Request body.
    pub body: Value,
    /// Timeout the caller requested.
    pub timeout: Duration,
}

/// In-memory session for tests: GET fixtures plus a write recorder.
///
/// Paths with no fixture fail the read, which doubles as mid-chain
/// failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockSession {
    responses: HashMap<String, Value>,
    write_response: Option<Value>,
    writes: Arc<Mutex<Vec<WriteRecord>>>,
    closed: Arc<AtomicBool>,
}

impl MockSession {
    /// Create an empty mock session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a GET fixture for a path.
    pub fn add_response(&mut self, path: impl Into<String>, value: Value) {
        self.responses.insert(path.into(), value);
    }

    /// Set the payload returned from every write call.
    ///
    /// Defaults to an empty object, which interprets as success.
    pub fn set_write_response(&mut self, value: Value) {
        self.write_response = Some(value);
    }

    /// All writes issued so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<WriteRecord> {
        match self.writes.lock() {
            Ok(locked) => locked.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether `close` has been called on this session.
    #[must_use]
    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, method: WriteMethod, path: &str, body: &Value, timeout: Duration) -> Value {
        let record = WriteRecord {
            method,
            path: path.to_string(),
            body: body.clone(),
            timeout,
        };
        match self.writes.lock() {
            Ok(mut locked) => locked.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
        self.write_response
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }
}

impl Session for MockSession {
    fn get(&self, path: &str) -> SessionResult<Value> {
        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| SessionError::Unreachable(format!("no fixture for {path}")))
    }

    fn post(&self, path: &str, body: &Value, timeout: Duration) -> SessionResult<Value> {
        Ok(self.record(WriteMethod::Post, path, body, timeout))
    }

    fn patch(&self, path: &str, body: &Value, timeout: Duration) -> SessionResult<Value> {
        Ok(self.record(WriteMethod::Patch, path, body, timeout))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// In-memory connector for tests.
///
/// Machines are registered with either a [`MockSession`] or a
/// [`SessionError`] that `open` should fail with. Opening an
/// unregistered machine reports it as unreachable.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    machines: HashMap<String, MockSession>,
    failures: HashMap<String, SessionError>,
}

impl MockConnector {
    /// Create an empty mock connector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a machine with its session fixtures.
    pub fn add_machine(&mut self, machine: impl Into<String>, session: MockSession) {
        self.machines.insert(machine.into(), session);
    }

    /// Make `open` fail for a machine with the given error.
    pub fn fail_machine(&mut self, machine: impl Into<String>, error: SessionError) {
        self.failures.insert(machine.into(), error);
    }

    /// Handle to a registered machine's session, for write assertions.
    #[must_use]
    pub fn session(&self, machine: &str) -> Option<&MockSession> {
        self.machines.get(machine)
    }
}

impl Connector for MockConnector {
    fn open(
        &self,
        machine: &str,
        _user: &str,
        _password: &str,
    ) -> SessionResult<Box<dyn Session>> {
        if let Some(error) = self.failures.get(machine) {
            return Err(error.clone());
        }
        self.machines
            .get(machine)
            .map(|session| Box::new(session.clone()) as Box<dyn Session>)
            .ok_or_else(|| SessionError::Unreachable(format!("unknown machine {machine}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mock_session_get_fixture() {
        let mut session = MockSession::new();
        session.add_response("/redfish/v1", json!({"Name": "Root Service"}));

        let value = session.get("/redfish/v1").unwrap();
        assert_eq!(value["Name"], "Root Service");
    }

    #[test]
    fn test_mock_session_get_missing_fixture_fails() {
        let session = MockSession::new();
        assert!(matches!(
            session.get("/redfish/v1/Systems"),
            Err(SessionError::Unreachable(_))
        ));
    }

    #[test]
    fn test_mock_session_records_writes() {
        let session = MockSession::new();
        session
            .post(
                "/redfish/v1/AccountService/Accounts",
                &json!({"UserName": "monitor"}),
                WRITE_TIMEOUT,
            )
            .unwrap();

        let writes = session.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].method, WriteMethod::Post);
        assert_eq!(writes[0].body["UserName"], "monitor");
        assert_eq!(writes[0].timeout, WRITE_TIMEOUT);
    }

    #[test]
    fn test_mock_session_write_response_default_is_empty_object() {
        let session = MockSession::new();
        let response = session
            .patch("/redfish/v1/x", &json!({}), WRITE_TIMEOUT)
            .unwrap();
        assert_eq!(response, json!({}));
    }

    #[test]
    fn test_mock_session_close_is_observable_across_clones() {
        let session = MockSession::new();
        let clone = session.clone();
        clone.close();
        assert!(session.was_closed());
    }

    #[test]
    fn test_mock_connector_unknown_machine() {
        let connector = MockConnector::new();
        assert!(matches!(
            connector.open("10.0.0.1", "root", "calvin"),
            Err(SessionError::Unreachable(_))
        ));
    }

    #[test]
    fn test_mock_connector_configured_failure() {
        let mut connector = MockConnector::new();
        connector.fail_machine("10.0.0.1", SessionError::InvalidCredentials);
        assert!(matches!(
            connector.open("10.0.0.1", "root", "wrong"),
            Err(SessionError::InvalidCredentials)
        ));
    }
}
