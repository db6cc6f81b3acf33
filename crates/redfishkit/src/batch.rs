//! Batch execution across the fleet.
//!
//! The runner walks the descriptor in stored order and drives the full
//! per-machine chain: open session, read system information, classify
//! vendor, provision, interpret, close. Every stage is failure
//! contained; a machine that is down, lies about its payloads, or
//! rejects the write produces its [`ProvisionResult`] and the batch
//! moves on. No per-machine error terminates the run.

use crate::error::{SessionError, SessionResult};
use crate::provision::members;
use crate::response;
use crate::session::{Connector, Session};
use crate::types::{Credentials, FleetDescriptor, Intent, Outcome, ProvisionResult, SystemInfo};
use crate::vendor::Vendor;
use rayon::ThreadPoolBuildError;
use rayon::prelude::*;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Default bound on concurrent sessions.
///
/// Out-of-band management segments are easy to overwhelm; eight
/// outstanding sessions keeps egress polite while still covering a
/// rack in one sweep.
pub const DEFAULT_JOBS: usize = 8;

/// Redfish systems collection.
const SYSTEMS_PATH: &str = "/redfish/v1/Systems";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Create new accounts or rotate existing ones.
    pub intent: Intent,
    /// Worker pool size (bounds outstanding sessions).
    pub jobs: usize,
    /// Cooperative cancellation flag. Machines not yet started when
    /// the flag is raised still emit a result so the run stays
    /// one-result-per-machine.
    pub cancel: Arc<AtomicBool>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            intent: Intent::Create,
            jobs: DEFAULT_JOBS,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Process every machine in the descriptor and return one result per
/// machine, in descriptor order.
///
/// # Errors
///
/// Fails only if the worker pool itself cannot be built; per-machine
/// failures are reported as outcomes, never as errors.
pub fn run(
    descriptor: &FleetDescriptor,
    connector: &dyn Connector,
    options: &BatchOptions,
) -> Result<Vec<ProvisionResult>, ThreadPoolBuildError> {
    let entries: Vec<(usize, &str, &Credentials)> = descriptor
        .iter()
        .enumerate()
        .map(|(index, (machine, credentials))| (index, machine.as_str(), credentials))
        .collect();

    let results: Mutex<Vec<(usize, ProvisionResult)>> =
        Mutex::new(Vec::with_capacity(entries.len()));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs.max(1))
        .build()?;

    pool.install(|| {
        entries.par_iter().for_each(|(index, machine, credentials)| {
            let result =
                process_machine(connector, machine, credentials, options.intent, &options.cancel);
            log::debug!("{}: {}", result.machine, result.outcome);
            push_result(&results, (*index, result));
        });
    });

    let mut collected = into_results(results);
    collected.sort_by_key(|(index, _)| *index);
    Ok(collected.into_iter().map(|(_, result)| result).collect())
}

/// Run the full chain for one machine. Never returns an error; every
/// failure is folded into the outcome.
fn process_machine(
    connector: &dyn Connector,
    machine: &str,
    credentials: &Credentials,
    intent: Intent,
    cancel: &AtomicBool,
) -> ProvisionResult {
    if cancel.load(Ordering::SeqCst) {
        return ProvisionResult::new(
            machine,
            &credentials.new_user,
            Outcome::ConnectFailure {
                reason: "run cancelled before connect".to_string(),
            },
        );
    }

    let session = match connector.open(machine, &credentials.admin_user, &credentials.admin_password)
    {
        Ok(session) => session,
        Err(err) => {
            return ProvisionResult::new(machine, &credentials.new_user, err.into_outcome());
        }
    };

    // Close on every exit path: provision() contains its own failures,
    // so this is the single close for this session.
    let outcome = provision(session.as_ref(), credentials, intent, cancel);
    session.close();

    ProvisionResult::new(machine, &credentials.new_user, outcome)
}

/// Classify the machine and execute the vendor workflow.
fn provision(
    session: &dyn Session,
    credentials: &Credentials,
    intent: Intent,
    cancel: &AtomicBool,
) -> Outcome {
    let info = match fetch_system_info(session) {
        Ok(info) => info,
        Err(err) => return err.into_outcome(),
    };

    let strategy = Vendor::classify(&info).strategy();

    // Workers already past the session open see an abort here, before
    // any write is issued.
    if cancel.load(Ordering::SeqCst) {
        return Outcome::ConnectFailure {
            reason: "run cancelled before write".to_string(),
        };
    }
    let written = match intent {
        Intent::Create => strategy.create(session, &info, credentials),
        Intent::Modify => strategy.modify(session, &info, credentials),
    };

    match written {
        Ok(raw) => response::interpret(&raw),
        Err(err) => err.into_outcome(),
    }
}

/// Read the system resource driving classification.
///
/// Reads the systems collection, follows its first member, and pulls
/// the manufacturer string plus the managing BMC link.
fn fetch_system_info(session: &dyn Session) -> SessionResult<SystemInfo> {
    let collection = session.get(SYSTEMS_PATH)?;
    let first = members(&collection).into_iter().next().ok_or_else(|| {
        SessionError::SessionCreation("systems collection has no members".to_string())
    })?;
    let system = session.get(&first)?;

    Ok(SystemInfo {
        manufacturer: system["Manufacturer"].as_str().unwrap_or_default().to_string(),
        manager_path: manager_link(&system),
    })
}

/// Managing BMC link, handling both the standard and the legacy
/// lowercase link casing older firmware emits.
fn manager_link(system: &Value) -> Option<String> {
    if let Some(path) = system["Links"]["ManagedBy"][0]["@odata.id"].as_str() {
        return Some(path.to_string());
    }
    system["links"]["ManagedBy"][0]["href"]
        .as_str()
        .map(str::to_string)
}

fn push_result(
    results: &Mutex<Vec<(usize, ProvisionResult)>>,
    entry: (usize, ProvisionResult),
) {
    match results.lock() {
        Ok(mut locked) => locked.push(entry),
        Err(poisoned) => poisoned.into_inner().push(entry),
    }
}

fn into_results(results: Mutex<Vec<(usize, ProvisionResult)>>) -> Vec<(usize, ProvisionResult)> {
    match results.into_inner() {
        Ok(collected) => collected,
        Err(poisoned) => poisoned.into_inner(),
    }
}
