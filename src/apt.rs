//! apt package operations (index refresh, install, clean, presence probe)

use std::collections::BTreeSet;

use crate::error::Result;
use crate::exec::{CommandRunner, CommandSpec, expect_success};

/// Refresh the package index (`apt-get update`)
///
/// A dead mirror fails here, before any interpreter or pip step runs.
pub fn update(runner: &dyn CommandRunner, verbose: bool) -> Result<()> {
    let spec = CommandSpec::new("apt-get").arg("update");
    let output = if verbose {
        runner.run_streaming(&spec)?
    } else {
        runner.run(&spec)?
    };
    expect_success(&spec, &output)
}

/// Install packages (`apt-get install -y --no-install-recommends`)
pub fn install(runner: &dyn CommandRunner, packages: &[String], verbose: bool) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let spec = CommandSpec::new("apt-get")
        .args(["install", "-y", "--no-install-recommends"])
        .args(packages.iter().cloned());
    let output = if verbose {
        runner.run_streaming(&spec)?
    } else {
        runner.run(&spec)?
    };
    expect_success(&spec, &output)
}

/// Drop the apt package cache (`apt-get clean`)
pub fn clean(runner: &dyn CommandRunner) -> Result<()> {
    let spec = CommandSpec::new("apt-get").arg("clean");
    let output = runner.run(&spec)?;
    expect_success(&spec, &output)
}

/// The set of packages dpkg reports as fully installed
pub fn installed_set(runner: &dyn CommandRunner) -> Result<BTreeSet<String>> {
    let spec = CommandSpec::new("dpkg-query").args(["-W", "-f", "${Package}\\t${Status}\\n"]);
    let output = runner.run(&spec)?;
    expect_success(&spec, &output)?;

    let mut installed = BTreeSet::new();
    for line in output.stdout.lines() {
        let Some((package, status)) = line.split_once('\t') else {
            continue;
        };
        if status.trim() == "install ok installed" {
            installed.insert(package.trim().to_string());
        }
    }
    Ok(installed)
}

/// Requested packages not yet installed, in manifest order
pub fn missing(runner: &dyn CommandRunner, packages: &[String]) -> Result<Vec<String>> {
    if packages.is_empty() {
        return Ok(Vec::new());
    }
    let installed = installed_set(runner)?;
    Ok(packages
        .iter()
        .filter(|package| !installed.contains(*package))
        .cloned()
        .collect())
}

/// Single-package presence check, used by the verifier
pub fn is_installed(runner: &dyn CommandRunner, package: &str) -> Result<bool> {
    let spec = CommandSpec::new("dpkg-query").args(["-W", "-f", "${Status}", package]);
    let output = runner.run(&spec)?;
    // dpkg-query exits non-zero for unknown packages
    if !output.success() {
        return Ok(false);
    }
    Ok(output.stdout.trim() == "install ok installed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvenvError;
    use crate::test_fixtures::{Script, ScriptedRunner};

    const DPKG_LISTING: &str = "swig\tinstall ok installed\n\
                                libxml2-dev\tinstall ok installed\n\
                                libgomp1\tdeinstall ok config-files\n";

    #[test]
    fn test_update_success() {
        let runner = ScriptedRunner::new();
        runner.push(Script::ok(""));
        assert!(update(&runner, false).is_ok());
        assert_eq!(runner.commands(), vec!["apt-get update"]);
    }

    #[test]
    fn test_update_mirror_failure() {
        let runner = ScriptedRunner::new();
        runner.push(Script::fail(100, "E: Unable to fetch some archives"));
        let err = update(&runner, false).unwrap_err();
        match err {
            ProvenvError::CommandFailed { command, stderr, .. } => {
                assert_eq!(command, "apt-get update");
                assert!(stderr.contains("Unable to fetch"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_install_skips_empty_set() {
        let runner = ScriptedRunner::new();
        assert!(install(&runner, &[], false).is_ok());
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_install_lists_packages() {
        let runner = ScriptedRunner::new();
        runner.push(Script::ok(""));
        let packages = vec!["swig".to_string(), "libxml2-dev".to_string()];
        assert!(install(&runner, &packages, false).is_ok());
        assert_eq!(
            runner.commands(),
            vec!["apt-get install -y --no-install-recommends swig libxml2-dev"]
        );
    }

    #[test]
    fn test_installed_set_filters_status() {
        let runner = ScriptedRunner::new();
        runner.push(Script::ok(DPKG_LISTING));
        let installed = installed_set(&runner).unwrap();
        assert!(installed.contains("swig"));
        assert!(installed.contains("libxml2-dev"));
        // Removed-but-configured packages do not count as present
        assert!(!installed.contains("libgomp1"));
    }

    #[test]
    fn test_missing_preserves_manifest_order() {
        let runner = ScriptedRunner::new();
        runner.push(Script::ok(DPKG_LISTING));
        let requested = vec![
            "libgomp1".to_string(),
            "swig".to_string(),
            "build-essential".to_string(),
        ];
        let missing = missing(&runner, &requested).unwrap();
        assert_eq!(missing, vec!["libgomp1", "build-essential"]);
    }

    #[test]
    fn test_is_installed_unknown_package() {
        let runner = ScriptedRunner::new();
        runner.push(Script::fail(1, "dpkg-query: no packages found matching nope"));
        assert!(!is_installed(&runner, "nope").unwrap());
    }

    #[test]
    fn test_is_installed_present_package() {
        let runner = ScriptedRunner::new();
        runner.push(Script::ok("install ok installed"));
        assert!(is_installed(&runner, "swig").unwrap());
    }
}
