//! Build environment checks (recipe, repository directory).

use crate::config::{Config, RECIPE_FILE};

use super::types::CheckResult;
use super::validators::validate_recipe;

/// Check the build environment. Read-only: nothing is created.
pub fn check_build_environment(config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let recipe = config.recipe_path();
    if recipe.is_file() {
        match validate_recipe(&recipe) {
            Ok(pkgname) => results.push(CheckResult::pass_with(RECIPE_FILE, &pkgname)),
            Err(e) => results.push(CheckResult::fail(RECIPE_FILE, &e)),
        }
    } else {
        results.push(CheckResult::fail(
            RECIPE_FILE,
            &format!("Not found in {}", config.build_dir.display()),
        ));
    }

    let repo_dir = &config.repo_dir;
    if repo_dir.is_dir() {
        results.push(CheckResult::pass_with("repo dir", &repo_dir.display().to_string()));
    } else if repo_dir.exists() {
        results.push(CheckResult::fail(
            "repo dir",
            &format!("{} exists but is not a directory", repo_dir.display()),
        ));
    } else {
        results.push(CheckResult::pass_with(
            "repo dir",
            &format!("{} (will be created)", repo_dir.display()),
        ));
    }

    results
}
