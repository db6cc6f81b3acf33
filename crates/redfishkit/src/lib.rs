//! # redfishkit
//!
//! Pure Rust library for provisioning a restricted read-only account
//! on every BMC in a heterogeneous fleet over the Redfish protocol.
//!
//! This crate provides functionality for:
//! - Loading and validating a YAML fleet descriptor
//! - Opening authenticated Redfish sessions (HTTPS, session token)
//! - Classifying machines by vendor and applying the matching
//!   provisioning workflow (generic Redfish, HP/HPE iLO, Dell iDRAC)
//! - Normalizing vendor error payloads into one outcome taxonomy
//! - Running the fleet under a bounded worker pool with per-machine
//!   failure isolation
//!
//! ## Example
//!
//! ```no_run
//! use redfishkit::{BatchOptions, HttpConnector, descriptor};
//!
//! let fleet = descriptor::load("fleet.yml").expect("invalid descriptor");
//! let connector = HttpConnector::new();
//!
//! let results = redfishkit::run(&fleet, &connector, &BatchOptions::default())
//!     .expect("worker pool failed to start");
//!
//! for result in results {
//!     println!("{}: '{}' {}", result.machine, result.account, result.outcome);
//! }
//! ```
//!
//! ## Failure model
//!
//! Descriptor validation errors are fatal and abort the run before any
//! network activity. Everything that happens against an individual
//! machine (unreachable BMC, rejected credentials, missing read-only
//! role, exhausted Dell slot table, vendor error payloads) is folded
//! into that machine's [`Outcome`] and never stops the batch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod descriptor;
pub mod error;
pub mod provision;
pub mod response;
pub mod session;
pub mod types;
pub mod vendor;

pub use batch::{BatchOptions, DEFAULT_JOBS, run};
pub use error::{DescriptorError, ProvisionError, SessionError};
pub use session::http::HttpConnector;
pub use session::{Connector, MockConnector, MockSession, Session};
pub use types::{
    Credentials, FleetDescriptor, Intent, Outcome, ProvisionResult, SystemInfo,
};
pub use vendor::Vendor;
