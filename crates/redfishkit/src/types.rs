//! Core types for fleet account provisioning.
//!
//! This module contains the fundamental data structures used throughout
//! the redfishkit crate: the per-machine credential record, the
//! transient system information read from each BMC, Dell account slots,
//! and the per-machine provisioning result.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;

/// The fleet descriptor: machine address mapped to its credentials.
///
/// Insertion order is the YAML document order and defines both batch
/// order and the order of the result sequence.
pub type FleetDescriptor = IndexMap<String, Credentials>;

/// Credentials for one machine in the fleet descriptor.
///
/// `admin_user`/`admin_password` authenticate the session against the
/// BMC; `new_user`/`new_password` describe the restricted account to
/// create or rotate. All four fields are required; validation happens
/// before any network activity (see [`crate::descriptor`]).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Root/administrator account used to open the session.
    pub admin_user: String,
    /// Password for the administrator account.
    pub admin_password: String,
    /// Name of the restricted account to create or rotate.
    pub new_user: String,
    /// Password for the restricted account.
    pub new_password: String,
}

/// Transient system information read once per machine.
///
/// Drives vendor classification and, for HP machines, the firmware
/// version lookup. Not retained after the machine is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// Manufacturer string as reported by the system resource.
    pub manufacturer: String,
    /// Resource path of the managing BMC, when the system links one.
    pub manager_path: Option<String>,
}

/// One position in a Dell iDRAC fixed account table.
///
/// iDRAC exposes a non-extensible slot table instead of a dynamic
/// account collection. A slot is free iff its user name is empty and
/// it is not the reserved root slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSlot {
    /// Slot id within the table ("1".."16" on most models).
    pub id: String,
    /// Account name occupying the slot; empty when the slot is free.
    pub user_name: String,
    /// Resource path of the slot.
    pub path: String,
}

impl AccountSlot {
    /// Whether this slot can receive a new account.
    ///
    /// Slot "1" is reserved for the factory root account and is never
    /// selected even when its user name reads as empty.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.user_name.is_empty() && self.id != crate::provision::RESERVED_SLOT_ID
    }
}

/// Whether the batch creates new accounts or rotates existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    /// Create the restricted account on each machine.
    #[default]
    Create,
    /// Update the password of an existing restricted account.
    Modify,
}

/// Final outcome of processing one machine.
///
/// Exactly one outcome is produced per descriptor entry per run,
/// regardless of how far the per-machine chain got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The account was created or updated.
    Success,
    /// The machine was unreachable, or the transport gave up.
    ConnectFailure {
        /// Human-readable connection failure reason.
        reason: String,
    },
    /// The BMC rejected the administrator credentials.
    AuthFailure,
    /// Session creation failed for a reason unrelated to credentials.
    SessionFailure {
        /// Human-readable session failure reason.
        reason: String,
    },
    /// No role matching "readonly" exists in the role collection.
    RoleNotFound,
    /// Every Dell account slot is occupied.
    NoFreeSlot,
    /// Modify intent, but no account with the target name exists.
    AccountNotFound,
    /// The BMC returned a structured error payload.
    VendorError {
        /// Message (or message identifier) extracted from the payload.
        message: String,
    },
    /// The BMC returned an error payload in no recognizable shape.
    UnparsableError,
}

impl Outcome {
    /// Whether this outcome represents a provisioned account.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "provisioned successfully"),
            Self::ConnectFailure { reason } => write!(f, "connection failed: {reason}"),
            Self::AuthFailure => write!(f, "invalid administrator credentials"),
            Self::SessionFailure { reason } => write!(f, "session creation failed: {reason}"),
            Self::RoleNotFound => write!(f, "no read-only role found"),
            Self::NoFreeSlot => write!(f, "no free account slot"),
            Self::AccountNotFound => write!(f, "account not found"),
            Self::VendorError { message } => write!(f, "rejected by BMC: {message}"),
            Self::UnparsableError => write!(f, "BMC returned an unparsable error payload"),
        }
    }
}

/// Result of processing one machine, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    /// Machine address from the fleet descriptor.
    pub machine: String,
    /// Name of the restricted account that was targeted.
    pub account: String,
    /// What happened.
    pub outcome: Outcome,
}

impl ProvisionResult {
    /// Create a result for one machine.
    #[must_use]
    pub fn new(
        machine: impl Into<String>,
        account: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            machine: machine.into(),
            account: account.into(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_free_requires_empty_user_name() {
        let slot = AccountSlot {
            id: "3".to_string(),
            user_name: "root".to_string(),
            path: "/redfish/v1/Managers/iDRAC.Embedded.1/Accounts/3".to_string(),
        };
        assert!(!slot.is_free());
    }

    #[test]
    fn test_slot_one_is_never_free() {
        let slot = AccountSlot {
            id: "1".to_string(),
            user_name: String::new(),
            path: "/redfish/v1/Managers/iDRAC.Embedded.1/Accounts/1".to_string(),
        };
        assert!(!slot.is_free());
    }

    #[test]
    fn test_slot_free() {
        let slot = AccountSlot {
            id: "4".to_string(),
            user_name: String::new(),
            path: "/redfish/v1/Managers/iDRAC.Embedded.1/Accounts/4".to_string(),
        };
        assert!(slot.is_free());
    }

    #[test]
    fn test_outcome_display_carries_vendor_message() {
        let outcome = Outcome::VendorError {
            message: "Base.1.0.GeneralError".to_string(),
        };
        assert!(outcome.to_string().contains("Base.1.0.GeneralError"));
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(Outcome::Success.is_success());
        assert!(!Outcome::RoleNotFound.is_success());
    }
}
