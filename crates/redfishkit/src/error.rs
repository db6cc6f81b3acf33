//! Error types for fleet provisioning.
//!
//! Two error layers exist with deliberately different blast radii:
//! [`DescriptorError`] is fatal and aborts the whole run before any
//! network activity; [`SessionError`] and [`ProvisionError`] are
//! per-machine, caught at the point of origin and converted into an
//! [`Outcome`](crate::types::Outcome) so one misbehaving machine never
//! aborts the batch.

use crate::types::Outcome;

/// Result type alias for per-machine session operations.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Fatal pre-flight errors in the fleet descriptor.
///
/// Any of these aborts the run before a single session is opened.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The descriptor file could not be read.
    #[error("failed to read descriptor {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The descriptor is not valid YAML or has the wrong shape.
    #[error("invalid descriptor: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A machine entry is missing one of the four required fields.
    #[error(
        "entry for '{machine}' is missing the '{field}' field; each machine \
         needs admin_user, admin_password, new_user and new_password"
    )]
    MissingField {
        /// Machine whose entry is malformed.
        machine: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The descriptor contains no machines.
    #[error("descriptor contains no machines")]
    Empty,
}

/// Per-machine session-layer failures.
///
/// The four variants are mutually exclusive by construction: the
/// transport reports unreachability and retry exhaustion distinctly,
/// a 401 on login is a credential rejection, and anything else that
/// breaks session creation is `SessionCreation`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// The machine is down or unreachable.
    #[error("machine is down or unreachable: {0}")]
    Unreachable(String),

    /// The transport retried a flaky connection and gave up.
    #[error("retries exhausted: {0}")]
    RetriesExhausted(String),

    /// The BMC rejected the administrator credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session creation failed for a non-credential reason.
    #[error("session creation failed: {0}")]
    SessionCreation(String),
}

impl SessionError {
    /// Convert this failure into the per-machine outcome it reports as.
    #[must_use]
    pub fn into_outcome(self) -> Outcome {
        match self {
            Self::Unreachable(reason) | Self::RetriesExhausted(reason) => {
                Outcome::ConnectFailure { reason }
            }
            Self::InvalidCredentials => Outcome::AuthFailure,
            Self::SessionCreation(reason) => Outcome::SessionFailure { reason },
        }
    }
}

/// Failures surfaced by a provisioning strategy.
///
/// Strategies either hand back the raw write response for
/// interpretation or fail with one of these; none of them is allowed
/// to escape the batch runner.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The session failed mid-provisioning (read or write).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The role collection carries no role matching "readonly".
    #[error("no role matching 'readonly' in the role collection")]
    RoleNotFound,

    /// Every slot in the fixed account table is occupied.
    #[error("no free account slot")]
    NoFreeSlot,

    /// Modify intent, but the target account does not exist.
    #[error("target account not found")]
    AccountNotFound,
}

impl ProvisionError {
    /// Convert this failure into the per-machine outcome it reports as.
    #[must_use]
    pub fn into_outcome(self) -> Outcome {
        match self {
            Self::Session(err) => err.into_outcome(),
            Self::RoleNotFound => Outcome::RoleNotFound,
            Self::NoFreeSlot => Outcome::NoFreeSlot,
            Self::AccountNotFound => Outcome::AccountNotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_outcome_mapping() {
        assert_eq!(
            SessionError::Unreachable("no route".to_string()).into_outcome(),
            Outcome::ConnectFailure {
                reason: "no route".to_string()
            }
        );
        assert_eq!(
            SessionError::RetriesExhausted("timed out".to_string()).into_outcome(),
            Outcome::ConnectFailure {
                reason: "timed out".to_string()
            }
        );
        assert_eq!(
            SessionError::InvalidCredentials.into_outcome(),
            Outcome::AuthFailure
        );
        assert_eq!(
            SessionError::SessionCreation("HTTP 503".to_string()).into_outcome(),
            Outcome::SessionFailure {
                reason: "HTTP 503".to_string()
            }
        );
    }

    #[test]
    fn test_provision_error_outcome_mapping() {
        assert_eq!(
            ProvisionError::RoleNotFound.into_outcome(),
            Outcome::RoleNotFound
        );
        assert_eq!(
            ProvisionError::NoFreeSlot.into_outcome(),
            Outcome::NoFreeSlot
        );
        assert_eq!(
            ProvisionError::AccountNotFound.into_outcome(),
            Outcome::AccountNotFound
        );
        assert_eq!(
            ProvisionError::Session(SessionError::InvalidCredentials).into_outcome(),
            Outcome::AuthFailure
        );
    }

    #[test]
    fn test_descriptor_error_display_names_machine_and_field() {
        let err = DescriptorError::MissingField {
            machine: "10.0.0.9".to_string(),
            field: "new_password",
        };
        let msg = err.to_string();
        assert!(msg.contains("10.0.0.9"));
        assert!(msg.contains("new_password"));
    }
}
