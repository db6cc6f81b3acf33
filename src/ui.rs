use colored::Colorize;
use redfishkit::ProvisionResult;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print the one-line report for a machine.
pub fn outcome_line(result: &ProvisionResult) {
    if result.outcome.is_success() {
        println!(
            "  {} The '{}' account for {} was {}",
            "✓".green(),
            result.account.bold(),
            result.machine,
            result.outcome
        );
    } else {
        println!(
            "  {} The '{}' account for {} was NOT provisioned: {}",
            "✗".red(),
            result.account.bold(),
            result.machine,
            result.outcome.to_string().yellow()
        );
    }
}
