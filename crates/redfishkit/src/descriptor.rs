//! Fleet descriptor loading and validation.
//!
//! The descriptor is a YAML mapping from machine address to the four
//! credential fields. Validation is all-or-nothing: every entry must
//! carry all four fields before any network activity begins, so a
//! single malformed entry fails the whole run up front rather than
//! surfacing halfway through a batch.
//!
//! ```yaml
//! 10.0.10.21:
//!   admin_user: root
//!   admin_password: calvin
//!   new_user: monitor
//!   new_password: s3cret
//! ```

use crate::error::DescriptorError;
use crate::types::{Credentials, FleetDescriptor};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// One descriptor entry as it appears on disk, before validation.
#[derive(Debug, Deserialize)]
struct RawEntry {
    admin_user: Option<String>,
    admin_password: Option<String>,
    new_user: Option<String>,
    new_password: Option<String>,
}

/// Load and validate a fleet descriptor from a YAML file.
///
/// # Errors
///
/// Returns a [`DescriptorError`] if the file cannot be read, is not
/// valid YAML, is empty, or any entry is missing a required field.
pub fn load(path: impl AsRef<Path>) -> Result<FleetDescriptor, DescriptorError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&contents)
}

/// Parse and validate a fleet descriptor from YAML text.
///
/// Entry order in the returned descriptor follows document order,
/// which in turn defines batch and result order.
///
/// # Errors
///
/// Returns a [`DescriptorError`] if the text is not a YAML mapping,
/// is empty, or any entry is missing a required field.
pub fn parse(contents: &str) -> Result<FleetDescriptor, DescriptorError> {
    let raw: IndexMap<String, RawEntry> = serde_yaml::from_str(contents)?;

    if raw.is_empty() {
        return Err(DescriptorError::Empty);
    }

    let mut descriptor = FleetDescriptor::with_capacity(raw.len());
    for (machine, entry) in raw {
        let credentials = validate_entry(&machine, entry)?;
        descriptor.insert(machine, credentials);
    }

    Ok(descriptor)
}

fn validate_entry(machine: &str, entry: RawEntry) -> Result<Credentials, DescriptorError> {
    let missing = |field: &'static str| DescriptorError::MissingField {
        machine: machine.to_string(),
        field,
    };

    Ok(Credentials {
        admin_user: entry.admin_user.ok_or_else(|| missing("admin_user"))?,
        admin_password: entry
            .admin_password
            .ok_or_else(|| missing("admin_password"))?,
        new_user: entry.new_user.ok_or_else(|| missing("new_user"))?,
        new_password: entry.new_password.ok_or_else(|| missing("new_password"))?,
    })
}
