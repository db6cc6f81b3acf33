//! Generic Redfish-compliant provisioning.

use super::{
    ACCOUNTS_PATH, ROLES_PATH, Strategy, account_body, find_account_path, members, password_body,
};
use crate::error::ProvisionError;
use crate::session::{Session, WRITE_TIMEOUT};
use crate::types::{Credentials, SystemInfo};
use serde_json::{Value, json};

/// Provisioning against a standards-compliant Redfish account service.
///
/// Create discovers the read-only role id from the role collection and
/// POSTs a new account; the role is not assumed to be literally named
/// "ReadOnly" since some firmware prefixes or decorates role ids.
pub struct GenericStrategy;

impl GenericStrategy {
    /// Find the role whose identifier contains "readonly".
    ///
    /// The role id is the last path segment of the first matching
    /// member, taken in collection order.
    fn find_readonly_role(session: &dyn Session) -> Result<String, ProvisionError> {
        let roles = session.get(ROLES_PATH)?;
        members(&roles)
            .iter()
            .find(|path| path.to_lowercase().contains("readonly"))
            .map(|path| {
                path.trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .unwrap_or(path)
                    .to_string()
            })
            .ok_or(ProvisionError::RoleNotFound)
    }
}

impl Strategy for GenericStrategy {
    fn create(
        &self,
        session: &dyn Session,
        _info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError> {
        // Resolve the role first so RoleNotFound never issues a write.
        let role_id = Self::find_readonly_role(session)?;

        let mut body = account_body(credentials);
        body["RoleId"] = json!(role_id);

        Ok(session.post(ACCOUNTS_PATH, &body, WRITE_TIMEOUT)?)
    }

    fn modify(
        &self,
        session: &dyn Session,
        _info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError> {
        let path = find_account_path(session, ACCOUNTS_PATH, &credentials.new_user)?
            .ok_or(ProvisionError::AccountNotFound)?;

        Ok(session.patch(&path, &password_body(credentials), WRITE_TIMEOUT)?)
    }
}
