//! External commands.
//!
//! Every external tool the pipeline drives (makepkg, repo-add, git, pacman)
//! is described by an [`Invocation`] and executed through a
//! [`CommandRunner`]. The real runner spawns processes; tests substitute a
//! mock or a recording fake.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Placeholder shown wherever a secret argument would appear.
pub const REDACTED: &str = "***";

/// Exit status and captured output of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, `None` if terminated by signal.
    pub code: Option<i32>,
    /// Captured stdout (empty for streamed commands).
    pub stdout: String,
    /// Captured stderr (empty for streamed commands).
    pub stderr: String,
}

impl CommandResult {
    /// A successful result with no output.
    pub fn ok() -> Self {
        Self::with_output(0, "", "")
    }

    /// A result with the given exit code and output.
    pub fn with_output(code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code, -1 if killed by a signal.
    pub fn code(&self) -> i32 {
        self.code.unwrap_or(-1)
    }

    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Plain(String),
    Secret(String),
}

impl Arg {
    fn value(&self) -> &str {
        match self {
            Arg::Plain(s) | Arg::Secret(s) => s,
        }
    }
}

/// Builder describing one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<Arg>,
    current_dir: Option<PathBuf>,
    /// Non-zero exit is returned, not raised.
    allow_fail: bool,
    /// Stdio is inherited, nothing is captured.
    interactive: bool,
    error_prefix: Option<String>,
    /// Values scrubbed from error output.
    hidden: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            allow_fail: false,
            interactive: false,
            error_prefix: None,
            hidden: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(Arg::Plain(arg.as_ref().to_string()));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(Arg::Plain(arg.as_ref().to_string()));
        }
        self
    }

    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args
            .push(Arg::Plain(path.to_string_lossy().into_owned()));
        self
    }

    /// Add an argument that must never be printed or logged.
    pub fn secret_arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(Arg::Secret(arg.as_ref().to_string()));
        self
    }

    /// Scrub `value` from any error output without passing it as an argument.
    pub fn hide(mut self, value: impl AsRef<str>) -> Self {
        self.hidden.push(value.as_ref().to_string());
        self
    }

    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Hand non-zero exits back to the caller instead of failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Stream output to the terminal. makepkg and pacman prompt here.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Prefix for the error raised on failure (default `'<program>' failed`).
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The real argument vector, secrets included.
    pub fn argv(&self) -> Vec<&str> {
        self.args.iter().map(Arg::value).collect()
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Render the command line with secrets replaced by [`REDACTED`].
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            match arg {
                Arg::Plain(s) => line.push_str(s),
                Arg::Secret(_) => line.push_str(REDACTED),
            }
        }
        line
    }

    /// Replace every secret argument occurring in `text`.
    pub fn redact(&self, text: &str) -> String {
        self.args
            .iter()
            .filter_map(|a| match a {
                Arg::Secret(s) => Some(s.as_str()),
                Arg::Plain(_) => None,
            })
            .chain(self.hidden.iter().map(String::as_str))
            .filter(|s| !s.is_empty())
            .fold(text.to_string(), |acc, secret| {
                acc.replace(secret, REDACTED)
            })
    }

    /// Execute through `runner` and apply this invocation's failure policy.
    pub fn run(&self, runner: &dyn CommandRunner) -> Result<CommandResult> {
        let result = runner.run(self)?;
        self.check(result)
    }

    fn check(&self, result: CommandResult) -> Result<CommandResult> {
        if self.allow_fail || result.success() {
            return Ok(result);
        }

        let prefix = match &self.error_prefix {
            Some(prefix) => prefix.clone(),
            None => format!("'{}' failed", self.program),
        };
        match self.redact(result.stderr_trimmed()) {
            stderr if stderr.is_empty() => bail!("{} (exit code {})", prefix, result.code()),
            stderr => bail!("{} (exit code {}):\n{}", prefix, result.code(), stderr),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Capability to execute external programs.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait CommandRunner {
    /// Execute the invocation and report its exit status and output.
    ///
    /// Returns `Err` only if the process could not be spawned; a non-zero
    /// exit is reported through [`CommandResult`].
    fn run(&self, invocation: &Invocation) -> Result<CommandResult>;

    /// Resolve a program on `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Runner that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.argv());

        if let Some(dir) = invocation.current_dir() {
            cmd.current_dir(dir);
        }

        tracing::debug!(
            command = %invocation,
            dir = ?invocation.current_dir(),
            "running external command"
        );

        let spawn_failed = || format!("cannot run '{}': is it installed?", invocation.program());
        let result = if invocation.is_interactive() {
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .with_context(spawn_failed)?;
            CommandResult {
                code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            }
        } else {
            let output = cmd.output().with_context(spawn_failed)?;
            CommandResult {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        };

        tracing::debug!(program = invocation.program(), code = ?result.code, "command finished");
        Ok(result)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
