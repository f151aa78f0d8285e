//! Rendering of plans, reports and the resolved manifest

use console::style;

use crate::config::Manifest;
use crate::plan::Plan;
use crate::verify::{CheckStatus, Report};

/// Human-readable byte size (same rounding the cache stats use)
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Print the computed plan
pub fn print_plan(plan: &Plan, detailed: bool) {
    if plan.is_converged() {
        println!("{}", style("Environment already converged.").green());
        return;
    }

    println!(
        "{}",
        style(format!("Plan: {} step(s)", plan.len())).bold()
    );
    for (index, action) in plan.actions.iter().enumerate() {
        println!("  {}. {}", index + 1, action.summary());
        if detailed {
            for line in action.detail() {
                println!("       {}", style(line).dim());
            }
        }
    }
}

/// Print the verification report as text
pub fn print_report(report: &Report) {
    println!(
        "{}",
        style(format!("Verification report for '{}':", report.environment)).bold()
    );

    for check in &report.checks {
        match check.status {
            CheckStatus::Pass => {
                println!("  {} {}", style("ok").green(), check.name);
            }
            CheckStatus::Fail => {
                println!(
                    "  {} {} (expected {}, got {})",
                    style("FAIL").red().bold(),
                    check.name,
                    check.expected,
                    check.actual
                );
            }
        }
    }

    println!();
    if report.passed() {
        println!(
            "{}",
            style(format!("All {} checks passed.", report.total())).green()
        );
    } else {
        println!(
            "{}",
            style(format!(
                "{} of {} checks failed.",
                report.failed_count(),
                report.total()
            ))
            .red()
        );
    }
}

/// Print the resolved manifest for operator inspection
pub fn print_manifest(manifest: &Manifest) {
    println!("{}", style(format!("Environment: {}", manifest.name)).bold());
    println!("  Python: {}", manifest.python);
    println!("  Venv: {}", manifest.venv.display());

    if !manifest.environment.is_empty() {
        println!("  Extra environment:");
        for (key, value) in &manifest.environment {
            println!("    {}={}", key, value);
        }
    }

    for (group, packages) in &manifest.os_packages {
        println!("  OS packages [{}]: {}", group, packages.join(", "));
    }

    if !manifest.bootstrap.is_empty() {
        let pins: Vec<String> = manifest.bootstrap.iter().map(ToString::to_string).collect();
        println!("  Bootstrap: {}", pins.join(", "));
    }

    if let Some(requirements) = &manifest.requirements {
        println!("  Requirements: {}", requirements.display());
    }

    for package in &manifest.isolated {
        println!(
            "  Isolated: {} (import {})",
            package.pin,
            package.import_name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
