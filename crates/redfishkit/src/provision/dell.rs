//! Dell iDRAC provisioning.

use super::{READ_ONLY_ROLE, Strategy, account_body, members, password_body};
use crate::error::{ProvisionError, SessionResult};
use crate::session::{Session, WRITE_TIMEOUT};
use crate::types::{AccountSlot, Credentials, SystemInfo};
use serde_json::{Value, json};

/// iDRAC fixed account table.
pub const DELL_ACCOUNTS_PATH: &str = "/redfish/v1/Managers/iDRAC.Embedded.1/Accounts/";

/// Provisioning for Dell iDRAC.
///
/// iDRAC has no dynamic account collection; accounts live in a fixed,
/// non-extensible slot table. Create therefore PATCHes the first free
/// slot instead of POSTing, and an exhausted table is the explicit
/// [`ProvisionError::NoFreeSlot`] failure.
pub struct DellStrategy;

impl DellStrategy {
    /// Linear scan of the slot table, stopping at the first slot the
    /// predicate accepts.
    fn find_slot(
        session: &dyn Session,
        accept: impl Fn(&AccountSlot) -> bool,
    ) -> SessionResult<Option<AccountSlot>> {
        let collection = session.get(DELL_ACCOUNTS_PATH)?;
        for path in members(&collection) {
            let account = session.get(&path)?;
            let slot = AccountSlot {
                id: account["Id"].as_str().unwrap_or_default().to_string(),
                user_name: account["UserName"].as_str().unwrap_or_default().to_string(),
                path,
            };
            if accept(&slot) {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }
}

impl Strategy for DellStrategy {
    fn create(
        &self,
        session: &dyn Session,
        _info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError> {
        let slot =
            Self::find_slot(session, AccountSlot::is_free)?.ok_or(ProvisionError::NoFreeSlot)?;

        let mut body = account_body(credentials);
        body["RoleId"] = json!(READ_ONLY_ROLE);

        Ok(session.patch(&slot.path, &body, WRITE_TIMEOUT)?)
    }

    fn modify(
        &self,
        session: &dyn Session,
        _info: &SystemInfo,
        credentials: &Credentials,
    ) -> Result<Value, ProvisionError> {
        let slot = Self::find_slot(session, |slot| slot.user_name == credentials.new_user)?
            .ok_or(ProvisionError::AccountNotFound)?;

        Ok(session.patch(&slot.path, &password_body(credentials), WRITE_TIMEOUT)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MockSession, WriteMethod};
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            admin_user: "root".to_string(),
            admin_password: "calvin".to_string(),
            new_user: "monitor".to_string(),
            new_password: "s3cret".to_string(),
        }
    }

    fn info() -> SystemInfo {
        SystemInfo {
            manufacturer: "Dell Inc.".to_string(),
            manager_path: None,
        }
    }

    fn slot_path(id: &str) -> String {
        format!("/redfish/v1/Managers/iDRAC.Embedded.1/Accounts/{id}")
    }

    /// Slot table where each (id, user) pair is one slot.
    fn session_with_slots(slots: &[(&str, &str)]) -> MockSession {
        let mut session = MockSession::new();
        let member_list: Vec<_> = slots
            .iter()
            .map(|(id, _)| json!({ "@odata.id": slot_path(id) }))
            .collect();
        session.add_response(DELL_ACCOUNTS_PATH, json!({ "Members": member_list }));
        for (id, user) in slots {
            session.add_response(slot_path(id), json!({ "Id": id, "UserName": user }));
        }
        session
    }

    #[test]
    fn test_create_skips_reserved_slot_one() {
        // Slot 1 reads as empty but is reserved for the factory root.
        let session = session_with_slots(&[("1", ""), ("2", "root"), ("3", "")]);
        DellStrategy.create(&session, &info(), &credentials()).unwrap();

        let writes = session.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].method, WriteMethod::Patch);
        assert_eq!(writes[0].path, slot_path("3"));
    }

    #[test]
    fn test_create_takes_first_free_slot_in_scan_order() {
        let session = session_with_slots(&[("1", ""), ("2", ""), ("3", ""), ("4", "")]);
        DellStrategy.create(&session, &info(), &credentials()).unwrap();
        assert_eq!(session.writes()[0].path, slot_path("2"));
    }

    #[test]
    fn test_create_body_forces_readonly_role() {
        let session = session_with_slots(&[("2", "")]);
        DellStrategy.create(&session, &info(), &credentials()).unwrap();

        let body = &session.writes()[0].body;
        assert_eq!(body["RoleId"], "ReadOnly");
        assert_eq!(body["UserName"], "monitor");
        assert_eq!(body["Password"], "s3cret");
        assert_eq!(body["Enabled"], true);
        assert_eq!(session.writes()[0].timeout, WRITE_TIMEOUT);
    }

    #[test]
    fn test_create_full_table_issues_no_write() {
        let session = session_with_slots(&[("1", ""), ("2", "root"), ("3", "svc")]);
        let err = DellStrategy
            .create(&session, &info(), &credentials())
            .unwrap_err();
        assert!(matches!(err, ProvisionError::NoFreeSlot));
        assert!(session.writes().is_empty());
    }

    #[test]
    fn test_modify_patches_password_on_matching_slot() {
        let session = session_with_slots(&[("1", "root"), ("2", "monitor")]);
        DellStrategy.modify(&session, &info(), &credentials()).unwrap();

        let writes = session.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].path, slot_path("2"));
        assert_eq!(writes[0].body, json!({ "Password": "s3cret" }));
    }

    #[test]
    fn test_modify_missing_account_reports_not_found() {
        let session = session_with_slots(&[("1", "root"), ("2", "svc")]);
        let err = DellStrategy
            .modify(&session, &info(), &credentials())
            .unwrap_err();
        assert!(matches!(err, ProvisionError::AccountNotFound));
        assert!(session.writes().is_empty());
    }
}
