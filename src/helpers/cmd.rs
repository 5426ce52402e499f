//! External command execution
//!
//! Builder for running external tools (cmake, patch) with consistent error
//! handling, a spinner while they run, and a dry-run mode that only prints
//! the command line.

use crate::core::output;
use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Lines of stderr kept in the error of a failed command
const STDERR_TAIL_LINES: usize = 20;

/// Builder for an external command.
///
/// # Example
/// ```ignore
/// ToolCmd::new("cmake")
///     .arg("--build")
///     .arg(&build_dir)
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct ToolCmd {
    program: String,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    dry_run: bool,
}

impl ToolCmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            dry_run: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Print the command instead of running it.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The full command line, shell-quoted for display.
    pub fn command_line(&self) -> String {
        std::iter::once(shell_quote(&self.program))
            .chain(self.args.iter().map(|a| shell_quote(&a.to_string_lossy())))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command; a non-zero exit status is an error.
    pub fn run(&self) -> Result<()> {
        let line = self.command_line();

        if self.dry_run {
            output::detail(&format!("[dry-run] {}", line));
            return Ok(());
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        let pb = output::spinner(&format!("run: {}", truncate(&line)));
        let result = cmd.output();
        pb.finish_and_clear();

        let out = result.with_context(|| format!("command failed to start: {}", line))?;
        if !out.status.success() {
            output::detail(&format!("run: {} [FAILED]", truncate(&line)));
            bail!(
                "command failed with exit code {:?}\n  command: {}\n{}",
                out.status.code(),
                line,
                stderr_tail(&out.stderr)
            );
        }

        output::detail(&format!("run: {}", truncate(&line)));
        Ok(())
    }
}

/// Shell-quote a value for display.
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '=' | ':' | ',' | '+')
        })
    {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

fn truncate(line: &str) -> String {
    if line.chars().count() > 60 {
        let head: String = line.chars().take(57).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
