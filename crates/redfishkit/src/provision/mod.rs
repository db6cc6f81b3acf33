//! Account provisioning strategies.
//!
//! One [`Strategy`] implementation exists per vendor behavior:
//! [`GenericStrategy`] for standards-compliant Redfish account
//! services, [`HpStrategy`] for iLO and [`DellStrategy`] for iDRAC.
//! A strategy performs at most one collection read followed by at most
//! one write per machine and never retries; it either hands back the
//! raw write response for interpretation or fails with a
//! [`ProvisionError`].

pub mod dell;
pub mod generic;
pub mod hp;

pub use dell::DellStrategy;
pub use generic::GenericStrategy;
pub use hp::HpStrategy;

use crate::error::{ProvisionError, SessionResult};
use crate::session::Session;
use crate::types::{Credentials, SystemInfo};
use serde_json::{Value, json};

/// Standard Redfish accounts collection.
pub const ACCOUNTS_PATH: &str = "/redfish/v1/AccountService/Accounts";

/// Standard Redfish role collection.
pub const ROLES_PATH: &str = "/redfish/v1/AccountService/Roles";

/// Privilege role attached to every provisioned account.
pub const READ_ONLY_ROLE: &str = "ReadOnly";

/// Dell slot id reserved for the factory root account.
pub const RESERVED_SLOT_ID: &str = "1";

/// One vendor's create/modify workflow.
///
/// Selected once per machine via
/// [`Vendor::strategy`](crate::vendor::Vendor::strategy).
pub trait Strategy: Send + Sync {
    /// Create the restricted account.
    ///
    /// Returns the raw write response for interpretation.
    ///
    /// # Errors
    ///
    /// Fails with [`ProvisionError::RoleNotFound`] or
    /// [`ProvisionError::NoFreeSlot`] before any write is issued, or
    /// with a session error if a read or write call fails.
    fn create(
        &self,
        session: &dyn Session,
        info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError>;

    /// Rotate the restricted account's password.
    ///
    /// # Errors
    ///
    /// Fails with [`ProvisionError::AccountNotFound`] when no account
    /// carries the target name, or with a session error.
    fn modify(
        &self,
        session: &dyn Session,
        info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError>;
}

/// Member resource paths of a Redfish collection payload.
pub(crate) fn members(collection: &Value) -> Vec<String> {
    collection["Members"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry["@odata.id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Base account body shared by the generic and Dell create paths.
pub(crate) fn account_body(credentials: &Credentials) -> Value {
    json!({
        "UserName": credentials.new_user,
        "Password": credentials.new_password,
        "Enabled": true,
    })
}

/// Body for a password-only update.
pub(crate) fn password_body(credentials: &Credentials) -> Value {
    json!({ "Password": credentials.new_password })
}

/// Scan an accounts collection for the member carrying `user_name`.
///
/// Reads each member in collection order and stops at the first match.
pub(crate) fn find_account_path(
    session: &dyn Session,
    collection_path: &str,
    user_name: &str,
) -> SessionResult<Option<String>> {
    let collection = session.get(collection_path)?;
    for path in members(&collection) {
        let account = session.get(&path)?;
        if account["UserName"].as_str() == Some(user_name) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockSession;
    use serde_json::json;

    #[test]
    fn test_members_extracts_paths() {
        let collection = json!({
            "Members": [
                { "@odata.id": "/redfish/v1/AccountService/Roles/Administrator" },
                { "@odata.id": "/redfish/v1/AccountService/Roles/ReadOnly" },
            ]
        });
        assert_eq!(
            members(&collection),
            vec![
                "/redfish/v1/AccountService/Roles/Administrator",
                "/redfish/v1/AccountService/Roles/ReadOnly",
            ]
        );
    }

    #[test]
    fn test_members_missing_key_is_empty() {
        assert!(members(&json!({})).is_empty());
        assert!(members(&json!({"Members": "bogus"})).is_empty());
    }

    #[test]
    fn test_account_body_shape() {
        let credentials = Credentials {
            admin_user: "root".to_string(),
            admin_password: "calvin".to_string(),
            new_user: "monitor".to_string(),
            new_password: "s3cret".to_string(),
        };
        let body = account_body(&credentials);
        assert_eq!(body["UserName"], "monitor");
        assert_eq!(body["Password"], "s3cret");
        assert_eq!(body["Enabled"], true);
        assert!(body.get("RoleId").is_none());
    }

    #[test]
    fn test_find_account_path_stops_at_first_match() {
        let mut session = MockSession::new();
        session.add_response(
            ACCOUNTS_PATH,
            json!({
                "Members": [
                    { "@odata.id": "/redfish/v1/AccountService/Accounts/1" },
                    { "@odata.id": "/redfish/v1/AccountService/Accounts/2" },
                ]
            }),
        );
        session.add_response(
            "/redfish/v1/AccountService/Accounts/1",
            json!({ "Id": "1", "UserName": "root" }),
        );
        session.add_response(
            "/redfish/v1/AccountService/Accounts/2",
            json!({ "Id": "2", "UserName": "monitor" }),
        );

        let path = find_account_path(&session, ACCOUNTS_PATH, "monitor").unwrap();
        assert_eq!(
            path.as_deref(),
            Some("/redfish/v1/AccountService/Accounts/2")
        );
    }

    #[test]
    fn test_find_account_path_none_when_absent() {
        let mut session = MockSession::new();
        session.add_response(ACCOUNTS_PATH, json!({ "Members": [] }));

        let path = find_account_path(&session, ACCOUNTS_PATH, "monitor").unwrap();
        assert!(path.is_none());
    }
}
