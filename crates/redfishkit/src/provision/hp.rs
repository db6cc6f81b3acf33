//! HP/HPE iLO provisioning.

use super::{ACCOUNTS_PATH, GenericStrategy, READ_ONLY_ROLE, Strategy};
use crate::error::ProvisionError;
use crate::session::{Session, WRITE_TIMEOUT};
use crate::types::{Credentials, SystemInfo};
use serde_json::{Value, json};

/// iLO major version assumed when the manager link or firmware lookup
/// is unavailable. Version 5 is the majority case in the field, so the
/// default takes the standard RoleId path.
pub const DEFAULT_ILO_VERSION: u32 = 5;

/// Provisioning for HP/HPE iLO.
///
/// iLO 5 and later speak the standard account model; earlier firmware
/// has no RoleId concept for this purpose and keys account identity
/// off an Oem extension block instead. Only create diverges; modify is
/// the generic workflow.
pub struct HpStrategy;

impl HpStrategy {
    /// iLO major version from the manager's firmware-version string.
    ///
    /// Falls back to [`DEFAULT_ILO_VERSION`] when there is no manager
    /// link, the lookup fails, or the string carries no version digit.
    fn ilo_version(session: &dyn Session, info: &SystemInfo) -> u32 {
        let Some(manager_path) = &info.manager_path else {
            return DEFAULT_ILO_VERSION;
        };
        let manager = match session.get(manager_path) {
            Ok(manager) => manager,
            Err(err) => {
                log::debug!("manager lookup failed, assuming iLO {DEFAULT_ILO_VERSION}: {err}");
                return DEFAULT_ILO_VERSION;
            }
        };
        manager["FirmwareVersion"]
            .as_str()
            .and_then(parse_ilo_version)
            .unwrap_or(DEFAULT_ILO_VERSION)
    }
}

/// Major version digit from a firmware string like `"iLO 4 v2.53"`.
///
/// iLO firmware strings keep the major version at a fixed offset after
/// the product name.
fn parse_ilo_version(firmware: &str) -> Option<u32> {
    firmware.chars().nth(4).and_then(|c| c.to_digit(10))
}

impl Strategy for HpStrategy {
    fn create(
        &self,
        session: &dyn Session,
        info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError> {
        let mut body = json!({
            "UserName": credentials.new_user,
            "Password": credentials.new_password,
        });

        if Self::ilo_version(session, info) >= 5 {
            body["RoleId"] = json!(READ_ONLY_ROLE);
        } else {
            // Pre-v5 iLO keys identity off the Oem block: login
            // privilege plus the account name duplicated as LoginName.
            body["Oem"] = json!({
                "Hp": {
                    "Privileges": { "LoginPriv": true },
                    "LoginName": credentials.new_user,
                }
            });
        }

        Ok(session.post(ACCOUNTS_PATH, &body, WRITE_TIMEOUT)?)
    }

    fn modify(
        &self,
        session: &dyn Session,
        info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError> {
        GenericStrategy.modify(session, info, credentials)
    }
}
