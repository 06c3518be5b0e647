use crossterm::style::Stylize;

use crate::mail::decoders::DecodeWarning;
use crate::unsubscribe::registry::Registry;
use crate::unsubscribe::runner::{LinkOutcome, RunReport};

pub fn print_purple(output: &str) {
    println!("{}", output.magenta());
}

pub fn print_error(output: &str) {
    println!("{}", output.red());
}

pub fn print_warning(output: &str) {
    println!("{}", output.yellow());
}

pub fn print_success(output: &str) {
    println!("{}", output.green());
}

/// `N. sender` per line.
pub fn format_compact(registry: &Registry) -> String {
    registry
        .positioned()
        .map(|(pos, e)| format!("{pos}. {}\n", e.sender))
        .collect()
}

/// Position, sender, subject and every link.
pub fn format_verbose(registry: &Registry) -> String {
    let mut out = String::new();
    for (pos, e) in registry.positioned() {
        out.push_str(&format!("\n{pos}. Sender: {}\n", e.sender));
        out.push_str(&format!("   Subject: {}\n", e.subject));
        out.push_str("   Unsubscribe Links Found:\n");
        for link in &e.links {
            out.push_str(&format!("     - {link}\n"));
        }
    }
    out
}

pub fn print_compact(registry: &Registry) {
    print_purple(&format!("\n{} email(s) to unsubscribe from:", registry.len()));
    print!("{}", format_compact(registry));
}

pub fn print_verbose(registry: &Registry) {
    print_purple(&format!("\n{} email(s) to unsubscribe from:", registry.len()));
    print!("{}", format_verbose(registry));
}

pub fn print_decode_warning(warning: &DecodeWarning) {
    print_warning(&warning.to_string());
}

pub fn print_run_report(report: &RunReport) {
    println!(
        "\nAttempting to unsubscribe from: {}\nLinks found in email: {}",
        report.sender, report.subject
    );
    for attempt in &report.attempts {
        println!("Trying link: {}", attempt.link);
        match &attempt.outcome {
            LinkOutcome::Saved(key) => print_success(&format!("Saved response as {key}")),
            LinkOutcome::Status(code) => print_warning(&format!("Got status {code}, skipping")),
            LinkOutcome::Transport(e) => print_error(&format!("Request failed: {e}")),
            LinkOutcome::StoreFailed(e) => print_error(&format!("Could not save response: {e}")),
        }
    }
}
