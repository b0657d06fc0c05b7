//! Terminal output helpers.
//!
//! Steps go to stdout and are silenced by `--quiet`; warnings and errors
//! always go to stderr.

/// Top-level pipeline step.
pub fn step(quiet: bool, msg: &str) {
    if !quiet {
        println!("==> {}", msg);
    }
}

/// Sub-step of the current step.
pub fn detail(quiet: bool, msg: &str) {
    if !quiet {
        println!("  -> {}", msg);
    }
}

pub fn warn(msg: &str) {
    eprintln!("[WARN] {}", msg);
}

/// Print a fatal error with its cause chain on one line.
pub fn error(err: &anyhow::Error) {
    eprintln!("ERROR: {:#}", err);
}
