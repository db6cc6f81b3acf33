use anyhow::{Context as AnyhowContext, Result};
use redfishkit::{BatchOptions, HttpConnector, Intent, descriptor};

use crate::cli::ProvisionArgs;
use crate::ui;

/// Load the descriptor and provision every machine in it.
///
/// Descriptor problems are fatal and surface through the exit code;
/// per-machine outcomes are printed one line each and are purely
/// informational.
pub fn run(args: &ProvisionArgs, quiet: bool) -> Result<()> {
    let fleet = descriptor::load(&args.info)
        .with_context(|| format!("invalid fleet descriptor {}", args.info.display()))?;

    let intent = if args.modify {
        Intent::Modify
    } else {
        Intent::Create
    };

    if !quiet {
        ui::header(&format!("Provisioning {} machines", fleet.len()));
        ui::kv("Descriptor", &args.info.display().to_string());
        ui::kv(
            "Intent",
            match intent {
                Intent::Create => "create read-only account",
                Intent::Modify => "rotate existing password",
            },
        );
        ui::kv("Parallel sessions", &args.jobs.to_string());
        println!();
    }

    let connector = HttpConnector::new();
    let options = BatchOptions {
        intent,
        jobs: args.jobs,
        ..Default::default()
    };

    let results = redfishkit::run(&fleet, &connector, &options)
        .context("failed to build the session worker pool")?;

    for result in &results {
        ui::outcome_line(result);
    }

    let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
    let failed = results.len() - succeeded;

    println!();
    if failed == 0 {
        ui::success(&format!("Provisioned {succeeded} machines successfully!"));
    } else {
        ui::warn(&format!("Provisioned {succeeded}, {failed} failed"));
    }

    // The run itself succeeded once every descriptor entry was
    // processed; individual machine failures do not fail the process.
    Ok(())
}
