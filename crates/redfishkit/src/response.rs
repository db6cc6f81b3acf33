//! Write-response interpretation.
//!
//! BMCs disagree about how provisioning failures look on the wire.
//! This module normalizes the two shapes seen in the field into the
//! single [`Outcome`] taxonomy:
//!
//! * a structured `@Message.ExtendedInfo` list whose entries carry a
//!   human-readable `Message` or, failing that, a machine-readable
//!   `MessageId`;
//! * an `error.message` envelope that some firmware (notably iDRAC)
//!   wraps around every response, including successful ones, where a
//!   fixed sentinel string means the write actually went through.
//!
//! Anything that claims to be an error but fits neither shape is
//! [`Outcome::UnparsableError`]; interpretation never panics and never
//! aborts the batch.

use crate::types::Outcome;
use serde_json::Value;

/// Envelope message some firmware attaches to successful writes.
pub const SUCCESS_SENTINEL: &str = "The request completed successfully.";

/// Normalize a raw write response into an outcome.
///
/// A response with no error indicator at all is [`Outcome::Success`].
#[must_use]
pub fn interpret(response: &Value) -> Outcome {
    let Some(error) = response.get("error") else {
        return Outcome::Success;
    };

    // Shape (a): structured extended-info list. Prefer the
    // human-readable message, fall back to the identifier.
    if let Some(entries) = error.get("@Message.ExtendedInfo").and_then(Value::as_array) {
        if let Some(first) = entries.first() {
            if let Some(message) = first.get("Message").and_then(Value::as_str) {
                return Outcome::VendorError {
                    message: message.to_string(),
                };
            }
            if let Some(id) = first.get("MessageId").and_then(Value::as_str) {
                return Outcome::VendorError {
                    message: id.to_string(),
                };
            }
        }
        return Outcome::UnparsableError;
    }

    // Shape (b): plain message envelope, success-sentinel aware.
    if let Some(message) = error.get("message").and_then(Value::as_str) {
        if message == SUCCESS_SENTINEL {
            return Outcome::Success;
        }
        return Outcome::VendorError {
            message: message.to_string(),
        };
    }

    Outcome::UnparsableError
}
