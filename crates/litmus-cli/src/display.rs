//! Display formatting for CLI output

use console::style;

/// Print the outcome of a check and pass it through
pub fn verdict(holds: bool, subject: &str, check: &str) -> bool {
    if holds {
        println!(
            "{} {} {}",
            style("✓").green().bold(),
            style(subject).cyan(),
            check
        );
    } else {
        println!(
            "{} {} {}",
            style("✗").red().bold(),
            style(subject).cyan(),
            style(format!("not {}", check)).red()
        );
    }
    holds
}

/// Announce a step before it runs
pub fn step(message: &str, target: &str) {
    println!("{} {} {}", style("→").blue().bold(), message, style(target).cyan());
}
