//! Host tool availability checks.

use crate::build::checksums::UPDPKGSUMS;
use crate::build::makepkg::MAKEPKG;
use crate::config::Config;
use crate::git::GIT;
use crate::process::CommandRunner;
use crate::repo::REPO_ADD;

use super::types::CheckResult;

/// Check host tools are installed.
pub fn check_host_tools(runner: &dyn CommandRunner, config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    // Required tools with package hints
    let required_tools = [
        (MAKEPKG, "pacman", "Required to build packages"),
        (REPO_ADD, "pacman", "Required to rebuild the repository index"),
        ("bsdtar", "libarchive", "Required by repo-add to read package archives"),
    ];

    for (tool, package, purpose) in required_tools {
        results.push(check_tool_exists(runner, tool, package, purpose, true));
    }

    if config.update_checksums {
        results.push(check_tool_exists(
            runner,
            UPDPKGSUMS,
            "pacman-contrib",
            "Checksums will not be refreshed",
            false,
        ));
    } else {
        results.push(CheckResult::skip(UPDPKGSUMS, "--no-updpkgsums"));
    }

    if config.install {
        results.push(check_tool_exists(runner, "sudo", "sudo", "Required for --install", true));
        results.push(check_tool_exists(runner, "pacman", "pacman", "Required for --install", true));
    }

    if config.push {
        results.push(check_tool_exists(runner, GIT, "git", "Required for --push", true));
    } else {
        results.push(CheckResult::skip(GIT, "--push not requested"));
    }

    results
}

/// Check if a tool exists in PATH.
fn check_tool_exists(
    runner: &dyn CommandRunner,
    tool: &str,
    package: &str,
    purpose: &str,
    required: bool,
) -> CheckResult {
    match runner.locate(tool) {
        Some(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        None => {
            let msg = format!("Not found. Install '{}' package. {}", package, purpose);
            if required {
                CheckResult::fail(tool, &msg)
            } else {
                CheckResult::warn(tool, &msg)
            }
        }
    }
}
