use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bmcadm")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Provision read-only BMC accounts across a server fleet", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create (or rotate) the read-only account on every machine
    Provision(ProvisionArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ProvisionArgs {
    /// Path to the fleet descriptor YAML file
    #[arg(short, long, value_name = "FILE")]
    pub info: PathBuf,

    /// Rotate the password of an existing account instead of creating one
    #[arg(short, long)]
    pub modify: bool,

    /// Number of parallel BMC sessions
    #[arg(short, long, default_value_t = redfishkit::DEFAULT_JOBS)]
    pub jobs: usize,
}
