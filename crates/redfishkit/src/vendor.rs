//! Vendor classification.
//!
//! Account provisioning diverges by BMC vendor, so each machine is
//! classified exactly once from its system information and the
//! matching strategy is selected up front instead of re-checking
//! manufacturer strings at every call site.

use crate::provision::{DellStrategy, GenericStrategy, HpStrategy, Strategy};
use crate::types::SystemInfo;

/// Closed set of provisioning behaviors.
///
/// Anything that is neither HP/HPE nor Dell gets the Redfish-compliant
/// generic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    /// Standards-compliant Redfish account service.
    Generic,
    /// HP/HPE iLO; pre-v5 firmware lacks role-based account creation.
    Hp,
    /// Dell iDRAC; fixed, non-extensible account slot table.
    Dell,
}

impl Vendor {
    /// Classify a machine from its manufacturer string.
    ///
    /// Case-insensitive substring match, HP checked before Dell since
    /// its provisioning path departs earliest from the generic one.
    /// Unknown manufacturers default to [`Vendor::Generic`]. Pure, no
    /// network access.
    #[must_use]
    pub fn classify(info: &SystemInfo) -> Self {
        let manufacturer = info.manufacturer.to_lowercase();
        if manufacturer.contains("hp") {
            Self::Hp
        } else if manufacturer.contains("dell") {
            Self::Dell
        } else {
            Self::Generic
        }
    }

    /// The provisioning strategy for this vendor.
    #[must_use]
    pub fn strategy(&self) -> Box<dyn Strategy> {
        match self {
            Self::Generic => Box::new(GenericStrategy),
            Self::Hp => Box::new(HpStrategy),
            Self::Dell => Box::new(DellStrategy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(manufacturer: &str) -> SystemInfo {
        SystemInfo {
            manufacturer: manufacturer.to_string(),
            manager_path: None,
        }
    }

    #[test]
    fn test_classify_hp_variants() {
        assert_eq!(Vendor::classify(&info("HP")), Vendor::Hp);
        assert_eq!(Vendor::classify(&info("HPE")), Vendor::Hp);
        assert_eq!(Vendor::classify(&info("Hewlett Packard (HP)")), Vendor::Hp);
    }

    #[test]
    fn test_classify_dell() {
        assert_eq!(Vendor::classify(&info("Dell Inc.")), Vendor::Dell);
        assert_eq!(Vendor::classify(&info("DELL")), Vendor::Dell);
    }

    #[test]
    fn test_classify_unknown_defaults_to_generic() {
        assert_eq!(Vendor::classify(&info("Supermicro")), Vendor::Generic);
        assert_eq!(Vendor::classify(&info("Lenovo")), Vendor::Generic);
        assert_eq!(Vendor::classify(&info("")), Vendor::Generic);
    }

    #[test]
    fn test_hp_takes_priority_over_dell() {
        // Contrived, but the decision rule checks HP first.
        assert_eq!(Vendor::classify(&info("hp-dell-hybrid")), Vendor::Hp);
    }
}
