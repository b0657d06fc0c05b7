//! Recipe validation.
//!
//! An empty or unrelated file named PKGBUILD passes an existence check but
//! makes makepkg fail after the workspace has already been cleaned, so the
//! content is checked too.

use std::fs;
use std::path::Path;

/// Validate the recipe declares a package. Returns the package name.
pub fn validate_recipe(path: &Path) -> Result<String, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Cannot read: {}", e))?;

    if content.trim().is_empty() {
        return Err("File is empty".to_string());
    }

    declared_pkgname(&content).ok_or_else(|| "No pkgname= declaration".to_string())
}

/// First name in `pkgname=`, which may be a scalar, a one-line array or an
/// array spanning several lines.
fn declared_pkgname(content: &str) -> Option<String> {
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        let Some(value) = line.trim_start().strip_prefix("pkgname=") else {
            continue;
        };
        let mut value = strip_comment(value).to_string();
        if value.trim_start().starts_with('(') {
            while !value.contains(')') {
                let Some(next) = lines.next() else { break };
                value.push(' ');
                value.push_str(strip_comment(next));
            }
        }

        let first = value
            .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .map(|t| t.trim_matches(|c| c == '"' || c == '\''))
            .find(|t| !t.is_empty());
        if let Some(name) = first {
            return Some(name.to_string());
        }
    }
    None
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("")
}
